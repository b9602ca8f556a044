use crate::postgres::statements::{CREATE_PROFILE, GET_PROFILE, JOIN_COMMUNITY};
use crate::postgres::{client, write_failed};
use colonia_core::ids::{CommunityId, ProfileId};
use colonia_core::model::{NewProfile, Profile};
use colonia_core::repository::ProfileRepository;
use colonia_core::result::{Entity, OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::ResultExt;
use std::borrow::Borrow;
use tokio_postgres::Row;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileRepo {
    pool: Pool,
}

impl ProfileRepo {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_profile(row: impl Borrow<Row>) -> Profile {
    let row = row.borrow();
    Profile {
        id: ProfileId::from(row.get::<_, Uuid>("id")),
        email: row.get("email"),
        first_name: row.get("nombre"),
        last_name: row.get("apellido"),
        phone: row.get("telefono"),
        role_code: row.get("tipo_usuario_id"),
        community_id: row.get::<_, Option<Uuid>>("colonia_id").map(CommunityId::from),
        active: row.get("activo"),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    }
}

impl ProfileRepository for ProfileRepo {
    async fn get(&self, id: ProfileId) -> OptRepoResult<Profile> {
        let client = client(&self.pool, RepoError::Get(Entity::Profile)).await?;
        let statement = client
            .prepare_typed_cached(GET_PROFILE.query, GET_PROFILE.types)
            .await
            .change_context(RepoError::Get(Entity::Profile))?;

        let profile = client
            .query_opt(&statement, &[&id.into_inner()])
            .await
            .change_context(RepoError::Get(Entity::Profile))?
            .map(row_to_profile);
        Ok(profile)
    }

    async fn create(&self, new_profile: NewProfile) -> RepoResult<Profile> {
        let on_err = RepoError::Create(Entity::Profile, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(CREATE_PROFILE.query, CREATE_PROFILE.types)
            .await
            .change_context(RepoError::Create(Entity::Profile, Reason::Db))?;

        client
            .query_one(
                &statement,
                &[
                    &new_profile.id.into_inner(),
                    &new_profile.email,
                    &new_profile.first_name,
                    &new_profile.last_name,
                    &new_profile.phone,
                    &new_profile.role_code,
                ],
            )
            .await
            .map(row_to_profile)
            .map_err(|e| write_failed(e, RepoError::Create, Entity::Profile))
    }

    async fn join_community(
        &self,
        id: ProfileId,
        community_id: CommunityId,
    ) -> OptRepoResult<Profile> {
        let on_err = RepoError::Update(Entity::Profile, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(JOIN_COMMUNITY.query, JOIN_COMMUNITY.types)
            .await
            .change_context(RepoError::Update(Entity::Profile, Reason::Db))?;

        client
            .query_opt(&statement, &[&id.into_inner(), &community_id.into_inner()])
            .await
            .map(|row| row.map(row_to_profile))
            .map_err(|e| write_failed(e, RepoError::Update, Entity::Profile))
    }
}
