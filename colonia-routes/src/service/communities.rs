use crate::error::ServiceError;
use crate::session::SessionContext;
use crate::{OptServiceResult, ServiceResult, metrics};
use colonia_core::ids::CommunityId;
use colonia_core::model::{Community, NewCommunity, Profile, Residence};
use colonia_core::repository::{CommunityRepository, ProfileRepository, ResidenceRepository};
use colonia_core::result::Reason;
use colonia_core::{ColoniaEngine, is_present};
use error_stack::ResultExt;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub enum CreateCommunityOutcome {
    Created(Community),
    Invalid(&'static str),
    ProfileNotFound,
}

#[derive(Debug)]
pub enum JoinOutcome {
    Joined(Profile),
    CommunityNotFound,
    ProfileNotFound,
}

#[derive(Debug, Clone)]
pub struct CommunityService<E> {
    engine: E,
}

impl<E: ColoniaEngine> CommunityService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    #[instrument(skip_all, name = "service#get_community")]
    pub async fn get(&self, id: CommunityId) -> OptServiceResult<Community> {
        self.engine
            .communities()
            .get(id)
            .await
            .change_context(ServiceError)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Community>> {
        self.engine
            .communities()
            .list()
            .await
            .change_context(ServiceError)
    }

    /// Creates the community and makes the caller its administrator
    #[instrument(skip_all, name = "service#create_community", fields(profile_id = %context.profile_id))]
    pub async fn create(
        &self,
        context: &SessionContext,
        name: String,
        address: String,
    ) -> ServiceResult<CreateCommunityOutcome> {
        if !is_present(&name) {
            return Ok(CreateCommunityOutcome::Invalid("name is required"));
        }
        if !is_present(&address) {
            return Ok(CreateCommunityOutcome::Invalid("address is required"));
        }

        let result = self
            .engine
            .communities()
            .create_with_admin(NewCommunity::new(name, address), context.profile_id)
            .await;

        match result {
            Ok(community) => {
                info!("community {} created", community.id);
                metrics::increment_communities_created();
                Ok(CreateCommunityOutcome::Created(community))
            }
            Err(e) if e.current_context().reason() == Some(Reason::MissingReference) => {
                debug!("creator has no profile, nothing was written");
                Ok(CreateCommunityOutcome::ProfileNotFound)
            }
            Err(e) => Err(e.change_context(ServiceError)),
        }
    }

    /// Points the caller's profile at the community. No residence association is created.
    #[instrument(skip_all, name = "service#join_community", fields(profile_id = %context.profile_id))]
    pub async fn join(
        &self,
        context: &SessionContext,
        community_id: CommunityId,
    ) -> ServiceResult<JoinOutcome> {
        if self.get(community_id).await?.is_none() {
            return Ok(JoinOutcome::CommunityNotFound);
        }

        let joined = self
            .engine
            .profiles()
            .join_community(context.profile_id, community_id)
            .await
            .change_context(ServiceError)?;

        Ok(joined.map_or(JoinOutcome::ProfileNotFound, JoinOutcome::Joined))
    }

    /// `None` when the community does not exist
    #[instrument(skip_all, name = "service#community_residences")]
    pub async fn residences(&self, community_id: CommunityId) -> OptServiceResult<Vec<Residence>> {
        if self.get(community_id).await?.is_none() {
            return Ok(None);
        }

        self.engine
            .residences()
            .list_by_community(community_id)
            .await
            .change_context(ServiceError)
            .map(Some)
    }
}
