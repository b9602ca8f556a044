use crate::postgres::associations::encode_role;
use crate::postgres::statements::{
    CREATE_ASSOCIATION, CREATE_RESIDENCE, FIND_RESIDENCES, GET_RESIDENCE,
    LIST_COMMUNITY_RESIDENCES,
};
use crate::postgres::{client, write_failed};
use colonia_core::claim::ClaimTerms;
use colonia_core::ids::{AssociationId, CommunityId, ProfileId, ResidenceId};
use colonia_core::model::{NewResidence, Residence};
use colonia_core::repository::ResidenceRepository;
use colonia_core::result::{Entity, OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::ResultExt;
use itertools::Itertools;
use std::borrow::Borrow;
use tokio_postgres::Row;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ResidenceRepo {
    pool: Pool,
}

impl ResidenceRepo {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_residence(row: impl Borrow<Row>) -> Residence {
    let row = row.borrow();
    Residence {
        id: ResidenceId::from(row.get::<_, Uuid>("id")),
        number: row.get("numero"),
        street: row.get("calle"),
        reference: row.get("referencia"),
        community_id: CommunityId::from(row.get::<_, Uuid>("colonia_id")),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    }
}

impl ResidenceRepository for ResidenceRepo {
    async fn get(&self, id: ResidenceId) -> OptRepoResult<Residence> {
        let client = client(&self.pool, RepoError::Get(Entity::Residence)).await?;
        let statement = client
            .prepare_typed_cached(GET_RESIDENCE.query, GET_RESIDENCE.types)
            .await
            .change_context(RepoError::Get(Entity::Residence))?;

        let residence = client
            .query_opt(&statement, &[&id.into_inner()])
            .await
            .change_context(RepoError::Get(Entity::Residence))?
            .map(row_to_residence);
        Ok(residence)
    }

    async fn find_many(&self, ids: Vec<ResidenceId>) -> RepoResult<Vec<Residence>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let ids = ids
            .into_iter()
            .map(ResidenceId::into_inner)
            .unique()
            .collect::<Vec<_>>();

        let client = client(&self.pool, RepoError::List(Entity::Residence)).await?;
        let statement = client
            .prepare_typed_cached(FIND_RESIDENCES.query, FIND_RESIDENCES.types)
            .await
            .change_context(RepoError::List(Entity::Residence))?;

        let rows = client
            .query(&statement, &[&ids])
            .await
            .change_context(RepoError::List(Entity::Residence))?;
        Ok(rows.into_iter().map(row_to_residence).collect())
    }

    async fn list_by_community(&self, community_id: CommunityId) -> RepoResult<Vec<Residence>> {
        let client = client(&self.pool, RepoError::List(Entity::Residence)).await?;
        let statement = client
            .prepare_typed_cached(
                LIST_COMMUNITY_RESIDENCES.query,
                LIST_COMMUNITY_RESIDENCES.types,
            )
            .await
            .change_context(RepoError::List(Entity::Residence))?;

        let rows = client
            .query(&statement, &[&community_id.into_inner()])
            .await
            .change_context(RepoError::List(Entity::Residence))?;
        Ok(rows.into_iter().map(row_to_residence).collect())
    }

    async fn create_with_admin(
        &self,
        residences: Vec<NewResidence>,
        admin_id: ProfileId,
    ) -> RepoResult<Vec<Residence>> {
        if residences.is_empty() {
            warn!("no residences sent to data layer, not creating any");
            return Ok(vec![]);
        }

        let on_err = RepoError::Create(Entity::Residence, Reason::Db);
        let mut client = client(&self.pool, on_err).await?;
        let tx = client.transaction().await.change_context(on_err)?;

        let create_residence = tx
            .prepare_typed_cached(CREATE_RESIDENCE.query, CREATE_RESIDENCE.types)
            .await
            .change_context(on_err)?;
        let create_association = tx
            .prepare_typed_cached(CREATE_ASSOCIATION.query, CREATE_ASSOCIATION.types)
            .await
            .change_context(on_err)?;

        let terms = ClaimTerms::administrator();
        let mut created = Vec::with_capacity(residences.len());

        for new_residence in residences {
            let residence = tx
                .query_one(
                    &create_residence,
                    &[
                        &ResidenceId::new().into_inner(),
                        &new_residence.number,
                        &new_residence.street,
                        &new_residence.reference,
                        &new_residence.community_id.into_inner(),
                    ],
                )
                .await
                .map(row_to_residence)
                .map_err(|e| write_failed(e, RepoError::Create, Entity::Residence))?;

            tx.execute(
                &create_association,
                &[
                    &AssociationId::new().into_inner(),
                    &admin_id.into_inner(),
                    &residence.id.into_inner(),
                    &encode_role(terms.role),
                    &terms.principal,
                    &terms.verified,
                ],
            )
            .await
            .map_err(|e| write_failed(e, RepoError::Create, Entity::Association))?;

            created.push(residence);
        }

        tx.commit().await.change_context(on_err)?;
        debug!(
            "created {} residences with administrator {admin_id}",
            created.len()
        );

        Ok(created)
    }
}
