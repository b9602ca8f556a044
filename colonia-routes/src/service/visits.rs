use crate::error::ServiceError;
use crate::session::SessionContext;
use crate::{OptServiceResult, ServiceResult, metrics};
use colonia_core::ColoniaEngine;
use colonia_core::ids::{ProfileId, ResidenceId, VisitId};
use colonia_core::model::{Visit, VisitRequest, VisitValidationError};
use colonia_core::repository::{AssociationRepository, ResidenceRepository, VisitRepository};
use error_stack::ResultExt;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub enum RegisterVisitOutcome {
    Registered(Visit),
    Invalid(VisitValidationError),
    ResidenceNotFound,
    /// The caller has no association with the residence
    NotAssociated,
}

#[derive(Debug)]
pub enum ResidenceVisitsOutcome {
    Visits(Vec<Visit>),
    ResidenceNotFound,
    NotAssociated,
}

#[derive(Debug)]
pub enum ToggleVisitOutcome {
    Updated(Visit),
    NotFound,
    /// Only the profile that registered the visit may change it
    NotCreator,
}

#[derive(Debug, Clone)]
pub struct VisitService<E> {
    engine: E,
}

impl<E: ColoniaEngine> VisitService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Nothing is read or written until the request passes validation
    #[instrument(skip_all, name = "service#register_visit", fields(profile_id = %context.profile_id))]
    pub async fn register(
        &self,
        context: &SessionContext,
        request: VisitRequest,
    ) -> ServiceResult<RegisterVisitOutcome> {
        let new_visit = match request.validate(context.profile_id) {
            Ok(new_visit) => new_visit,
            Err(e) => {
                debug!("visit rejected: {e}");
                return Ok(RegisterVisitOutcome::Invalid(e));
            }
        };

        let residence = self
            .engine
            .residences()
            .get(new_visit.residence_id)
            .await
            .change_context(ServiceError)?;
        if residence.is_none() {
            return Ok(RegisterVisitOutcome::ResidenceNotFound);
        }

        if !self
            .is_associated(context.profile_id, new_visit.residence_id)
            .await?
        {
            return Ok(RegisterVisitOutcome::NotAssociated);
        }

        let visit = self
            .engine
            .visits()
            .create(new_visit)
            .await
            .change_context(ServiceError)?;

        info!("visit {} registered, active: {}", visit.id, visit.active);
        metrics::increment_visits_registered();
        Ok(RegisterVisitOutcome::Registered(visit))
    }

    #[instrument(skip_all, name = "service#get_visit")]
    pub async fn get(&self, id: VisitId) -> OptServiceResult<Visit> {
        self.engine
            .visits()
            .get(id)
            .await
            .change_context(ServiceError)
    }

    #[instrument(skip_all, name = "service#residence_visits", fields(profile_id = %context.profile_id, residence_id = %residence_id))]
    pub async fn for_residence(
        &self,
        context: &SessionContext,
        residence_id: ResidenceId,
    ) -> ServiceResult<ResidenceVisitsOutcome> {
        let residence = self
            .engine
            .residences()
            .get(residence_id)
            .await
            .change_context(ServiceError)?;
        if residence.is_none() {
            return Ok(ResidenceVisitsOutcome::ResidenceNotFound);
        }

        if !self.is_associated(context.profile_id, residence_id).await? {
            return Ok(ResidenceVisitsOutcome::NotAssociated);
        }

        self.engine
            .visits()
            .list_by_residence(residence_id)
            .await
            .change_context(ServiceError)
            .map(ResidenceVisitsOutcome::Visits)
    }

    #[instrument(skip_all, name = "service#set_visit_active", fields(profile_id = %context.profile_id, visit_id = %visit_id, active = active))]
    pub async fn set_active(
        &self,
        context: &SessionContext,
        visit_id: VisitId,
        active: bool,
    ) -> ServiceResult<ToggleVisitOutcome> {
        let Some(visit) = self.get(visit_id).await? else {
            return Ok(ToggleVisitOutcome::NotFound);
        };

        if visit.created_by != context.profile_id {
            return Ok(ToggleVisitOutcome::NotCreator);
        }

        if visit.active == active {
            return Ok(ToggleVisitOutcome::Updated(visit));
        }

        let updated = self
            .engine
            .visits()
            .set_active(visit_id, active)
            .await
            .change_context(ServiceError)?;

        Ok(updated.map_or(ToggleVisitOutcome::NotFound, ToggleVisitOutcome::Updated))
    }

    async fn is_associated(
        &self,
        profile_id: ProfileId,
        residence_id: ResidenceId,
    ) -> ServiceResult<bool> {
        self.engine
            .associations()
            .find(profile_id, residence_id)
            .await
            .change_context(ServiceError)
            .map(|association| association.is_some())
    }
}
