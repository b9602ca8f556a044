use crate::error::ServiceError;
use crate::session::SessionContext;
use crate::{OptServiceResult, ServiceResult, metrics};
use colonia_core::claim::ClaimKind;
use colonia_core::ids::{CommunityId, ProfileId, ResidenceId};
use colonia_core::model::{Association, NewAssociation, NewResidence, Profile, Residence};
use colonia_core::range::{LARGE_RANGE_THRESHOLD, ResidenceRange};
use colonia_core::repository::{
    AssociationRepository, CommunityRepository, ProfileRepository, ResidenceRepository,
};
use colonia_core::{ColoniaEngine, is_present};
use error_stack::ResultExt;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub enum CreateResidencesOutcome {
    Created {
        residences: Vec<Residence>,
        /// Set when the request was accepted but looks like a mistake
        warning: Option<String>,
    },
    Invalid(String),
    CommunityNotFound,
    ProfileNotFound,
    NotAdministrator,
}

#[derive(Debug)]
pub enum ClaimOutcome {
    Claimed {
        association: Association,
        kind: ClaimKind,
    },
    ResidenceNotFound,
    ProfileNotFound,
    /// The claimant has not joined any community yet
    NoCommunity,
    /// The residence belongs to a community other than the claimant's
    OtherCommunity,
    AlreadyAssociated,
}

#[derive(Debug)]
pub enum VerifyOutcome {
    Verified(Association),
    ResidenceNotFound,
    AssociationNotFound,
    NotAdministrator,
}

enum AdminCheck {
    Allowed,
    Denied(CreateResidencesOutcome),
}

#[derive(Debug, Clone)]
pub struct ResidenceService<E> {
    engine: E,
}

impl<E: ColoniaEngine> ResidenceService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    #[instrument(skip_all, name = "service#get_residence")]
    pub async fn get(&self, id: ResidenceId) -> OptServiceResult<Residence> {
        self.engine
            .residences()
            .get(id)
            .await
            .change_context(ServiceError)
    }

    /// Looks up all the residences in one round trip, unknown ids are skipped
    pub async fn find_many(&self, ids: Vec<ResidenceId>) -> ServiceResult<Vec<Residence>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.engine
            .residences()
            .find_many(ids)
            .await
            .change_context(ServiceError)
    }

    pub async fn count_associations(&self, residence_id: ResidenceId) -> ServiceResult<u64> {
        self.engine
            .associations()
            .count_for_residence(residence_id)
            .await
            .change_context(ServiceError)
    }

    #[instrument(skip_all, name = "service#create_residence", fields(profile_id = %context.profile_id))]
    pub async fn create_one(
        &self,
        context: &SessionContext,
        number: String,
        street: String,
        reference: Option<String>,
        community_id: CommunityId,
    ) -> ServiceResult<CreateResidencesOutcome> {
        if !is_present(&number) {
            return Ok(CreateResidencesOutcome::Invalid("number is required".to_string()));
        }
        if !is_present(&street) {
            return Ok(CreateResidencesOutcome::Invalid("street is required".to_string()));
        }

        if let AdminCheck::Denied(outcome) = self.check_admin(context, community_id).await? {
            return Ok(outcome);
        }

        let new_residence = NewResidence::new(number, street, reference, community_id);
        self.create_with_admin(context.profile_id, vec![new_residence], None)
            .await
    }

    /// One residence per number in `start..=end`, all on the same street
    #[instrument(skip_all, name = "service#create_residences", fields(profile_id = %context.profile_id, start = start, end = end))]
    pub async fn create_bulk(
        &self,
        context: &SessionContext,
        street: String,
        start: u32,
        end: u32,
        reference: Option<String>,
        community_id: CommunityId,
    ) -> ServiceResult<CreateResidencesOutcome> {
        let range = match ResidenceRange::new(street, start, end, reference) {
            Ok(range) => range,
            Err(e) => return Ok(CreateResidencesOutcome::Invalid(e.to_string())),
        };

        if let AdminCheck::Denied(outcome) = self.check_admin(context, community_id).await? {
            return Ok(outcome);
        }

        let warning = range.is_large().then(|| {
            warn!("large range of {} residences requested", range.len());
            format!(
                "{} residences were created on {}, ranges wider than {LARGE_RANGE_THRESHOLD} are unusual",
                range.len(),
                range.street()
            )
        });

        self.create_with_admin(context.profile_id, range.residences(community_id), warning)
            .await
    }

    async fn check_admin(
        &self,
        context: &SessionContext,
        community_id: CommunityId,
    ) -> ServiceResult<AdminCheck> {
        let community = self
            .engine
            .communities()
            .get(community_id)
            .await
            .change_context(ServiceError)?;
        if community.is_none() {
            return Ok(AdminCheck::Denied(CreateResidencesOutcome::CommunityNotFound));
        }

        let Some(profile) = self.profile(context.profile_id).await? else {
            return Ok(AdminCheck::Denied(CreateResidencesOutcome::ProfileNotFound));
        };

        if profile.administers(community_id) {
            Ok(AdminCheck::Allowed)
        } else {
            debug!("{} does not administer {community_id}", profile.id);
            Ok(AdminCheck::Denied(CreateResidencesOutcome::NotAdministrator))
        }
    }

    async fn create_with_admin(
        &self,
        admin_id: ProfileId,
        residences: Vec<NewResidence>,
        warning: Option<String>,
    ) -> ServiceResult<CreateResidencesOutcome> {
        let residences = self
            .engine
            .residences()
            .create_with_admin(residences, admin_id)
            .await
            .change_context(ServiceError)?;

        info!("{} residences created", residences.len());
        metrics::increment_residences_created_by(residences.len());
        Ok(CreateResidencesOutcome::Created {
            residences,
            warning,
        })
    }

    async fn profile(&self, id: ProfileId) -> OptServiceResult<Profile> {
        self.engine
            .profiles()
            .get(id)
            .await
            .change_context(ServiceError)
    }

    /// Associates the caller with a residence of their community. Administrators are
    /// verified straight away, anyone else waits for an administrator to verify them.
    #[instrument(skip_all, name = "service#claim", fields(profile_id = %context.profile_id, residence_id = %residence_id))]
    pub async fn claim(
        &self,
        context: &SessionContext,
        residence_id: ResidenceId,
    ) -> ServiceResult<ClaimOutcome> {
        let Some(residence) = self.get(residence_id).await? else {
            return Ok(ClaimOutcome::ResidenceNotFound);
        };

        let Some(profile) = self.profile(context.profile_id).await? else {
            return Ok(ClaimOutcome::ProfileNotFound);
        };

        let Some(community_id) = profile.community_id else {
            return Ok(ClaimOutcome::NoCommunity);
        };

        if residence.community_id != community_id {
            debug!(
                "residence belongs to {}, claimant belongs to {community_id}",
                residence.community_id
            );
            return Ok(ClaimOutcome::OtherCommunity);
        }

        let associations = self.engine.associations();

        if associations
            .find(profile.id, residence_id)
            .await
            .change_context(ServiceError)?
            .is_some()
        {
            return Ok(ClaimOutcome::AlreadyAssociated);
        }

        let has_existing = self.count_associations(residence_id).await? > 0;
        let kind = ClaimKind::decide(profile.administers(community_id), has_existing);
        debug!("claim decided as {}", kind.as_str());

        let created = associations
            .create(NewAssociation::new(profile.id, residence_id, kind.terms()))
            .await;

        match created {
            Ok(association) => {
                metrics::increment_residences_claimed(kind.as_str());
                Ok(ClaimOutcome::Claimed { association, kind })
            }
            // a concurrent claim for the same pair got in first
            Err(e) if e.current_context().is_duplicate() => Ok(ClaimOutcome::AlreadyAssociated),
            Err(e) => Err(e.change_context(ServiceError)),
        }
    }

    /// Residences the caller is associated with, verified or not
    #[instrument(skip_all, name = "service#my_residences", fields(profile_id = %context.profile_id))]
    pub async fn mine(&self, context: &SessionContext) -> ServiceResult<Vec<Residence>> {
        let ids = self
            .engine
            .associations()
            .for_profile(context.profile_id)
            .await
            .change_context(ServiceError)?
            .into_iter()
            .map(|a| a.residence_id)
            .unique()
            .collect_vec();

        self.find_many(ids).await
    }

    /// `None` when the residence does not exist
    #[instrument(skip_all, name = "service#residence_associations")]
    pub async fn associations(&self, residence_id: ResidenceId) -> OptServiceResult<Vec<Association>> {
        if self.get(residence_id).await?.is_none() {
            return Ok(None);
        }

        self.engine
            .associations()
            .for_residence(residence_id)
            .await
            .change_context(ServiceError)
            .map(Some)
    }

    /// Marks a pending association verified. Only an administrator of the residence's
    /// community may do so; verifying twice leaves the association as it is.
    #[instrument(skip_all, name = "service#verify", fields(profile_id = %context.profile_id, residence_id = %residence_id, member_id = %member_id))]
    pub async fn verify(
        &self,
        context: &SessionContext,
        residence_id: ResidenceId,
        member_id: ProfileId,
    ) -> ServiceResult<VerifyOutcome> {
        let Some(residence) = self.get(residence_id).await? else {
            return Ok(VerifyOutcome::ResidenceNotFound);
        };

        let administers = self
            .profile(context.profile_id)
            .await?
            .is_some_and(|p| p.administers(residence.community_id));
        if !administers {
            return Ok(VerifyOutcome::NotAdministrator);
        }

        let verified = self
            .engine
            .associations()
            .verify(member_id, residence_id)
            .await
            .change_context(ServiceError)?;

        Ok(verified.map_or(VerifyOutcome::AssociationNotFound, |association| {
            info!("association of {member_id} verified");
            VerifyOutcome::Verified(association)
        }))
    }
}
