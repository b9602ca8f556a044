use crate::postgres::statements::{
    CREATE_COMMUNITY, GET_COMMUNITY, LIST_COMMUNITIES, PROMOTE_TO_ADMIN,
};
use crate::postgres::{client, write_failed};
use colonia_core::ids::{CommunityId, ProfileId};
use colonia_core::model::{Community, NewCommunity, Role};
use colonia_core::repository::CommunityRepository;
use colonia_core::result::{Entity, OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::{IntoReport, ResultExt};
use std::borrow::Borrow;
use tokio_postgres::Row;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommunityRepo {
    pool: Pool,
}

impl CommunityRepo {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_community(row: impl Borrow<Row>) -> Community {
    let row = row.borrow();
    Community {
        id: CommunityId::from(row.get::<_, Uuid>("id")),
        name: row.get("nombre"),
        address: row.get("direccion"),
        admin_id: row
            .get::<_, Option<Uuid>>("admin_principal_id")
            .map(ProfileId::from),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    }
}

impl CommunityRepository for CommunityRepo {
    async fn get(&self, id: CommunityId) -> OptRepoResult<Community> {
        let client = client(&self.pool, RepoError::Get(Entity::Community)).await?;
        let statement = client
            .prepare_typed_cached(GET_COMMUNITY.query, GET_COMMUNITY.types)
            .await
            .change_context(RepoError::Get(Entity::Community))?;

        let community = client
            .query_opt(&statement, &[&id.into_inner()])
            .await
            .change_context(RepoError::Get(Entity::Community))?
            .map(row_to_community);
        Ok(community)
    }

    async fn list(&self) -> RepoResult<Vec<Community>> {
        let client = client(&self.pool, RepoError::List(Entity::Community)).await?;
        let statement = client
            .prepare_typed_cached(LIST_COMMUNITIES.query, LIST_COMMUNITIES.types)
            .await
            .change_context(RepoError::List(Entity::Community))?;

        let rows = client
            .query(&statement, &[])
            .await
            .change_context(RepoError::List(Entity::Community))?;
        Ok(rows.into_iter().map(row_to_community).collect())
    }

    async fn create_with_admin(
        &self,
        new_community: NewCommunity,
        admin_id: ProfileId,
    ) -> RepoResult<Community> {
        let on_err = RepoError::Create(Entity::Community, Reason::Db);
        let mut client = client(&self.pool, on_err).await?;
        let tx = client.transaction().await.change_context(on_err)?;

        let create = tx
            .prepare_typed_cached(CREATE_COMMUNITY.query, CREATE_COMMUNITY.types)
            .await
            .change_context(on_err)?;
        let promote = tx
            .prepare_typed_cached(PROMOTE_TO_ADMIN.query, PROMOTE_TO_ADMIN.types)
            .await
            .change_context(on_err)?;

        let id = CommunityId::new();
        let community = tx
            .query_one(
                &create,
                &[
                    &id.into_inner(),
                    &new_community.name,
                    &new_community.address,
                    &admin_id.into_inner(),
                ],
            )
            .await
            .map(row_to_community)
            .map_err(|e| write_failed(e, RepoError::Create, Entity::Community))?;

        let promoted = tx
            .execute(
                &promote,
                &[
                    &admin_id.into_inner(),
                    &id.into_inner(),
                    &Role::ADMINISTRATOR_CODE,
                ],
            )
            .await
            .map_err(|e| write_failed(e, RepoError::Create, Entity::Community))?;

        if promoted != 1 {
            // dropping the transaction rolls the community insert back
            return Err(
                RepoError::Create(Entity::Community, Reason::MissingReference).into_report(),
            )
            .attach_with(|| format!("profile {admin_id} does not exist"));
        }

        tx.commit().await.change_context(on_err)?;
        debug!("community {id} created with administrator {admin_id}");

        Ok(community)
    }
}
