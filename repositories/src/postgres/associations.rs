use crate::postgres::statements::{
    COUNT_ASSOCIATIONS, CREATE_ASSOCIATION, FIND_ASSOCIATION, PROFILE_ASSOCIATIONS,
    RESIDENCE_ASSOCIATIONS, VERIFY_ASSOCIATION,
};
use crate::postgres::{client, write_failed};
use colonia_core::ids::{AssociationId, ProfileId, ResidenceId};
use colonia_core::model::{Association, AssociationRole, NewAssociation};
use colonia_core::repository::AssociationRepository;
use colonia_core::result::{Entity, OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::ResultExt;
use std::borrow::Borrow;
use tokio_postgres::Row;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct AssociationRepo {
    pool: Pool,
}

impl AssociationRepo {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// `rol` values as the mobile client has always written them
pub(crate) fn encode_role(role: AssociationRole) -> &'static str {
    match role {
        AssociationRole::Owner => "Propietario",
        AssociationRole::FamilyMember => "Familiar",
        AssociationRole::Administrator => "administrador",
    }
}

fn decode_role(rol: &str) -> AssociationRole {
    match rol.trim().to_lowercase().as_str() {
        "propietario" | "owner" => AssociationRole::Owner,
        "administrador" | "administrator" => AssociationRole::Administrator,
        "familiar" | "family_member" => AssociationRole::FamilyMember,
        other => {
            warn!("unrecognised association role '{other}', treating it as a family member");
            AssociationRole::FamilyMember
        }
    }
}

fn row_to_association(row: impl Borrow<Row>) -> Association {
    let row = row.borrow();
    Association {
        id: AssociationId::from(row.get::<_, Uuid>("id")),
        profile_id: ProfileId::from(row.get::<_, Uuid>("usuario_id")),
        residence_id: ResidenceId::from(row.get::<_, Uuid>("residencia_id")),
        role: decode_role(row.get("rol")),
        principal: row.get("es_principal"),
        verified: row.get("verificado"),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    }
}

impl AssociationRepository for AssociationRepo {
    async fn count_for_residence(&self, residence_id: ResidenceId) -> RepoResult<u64> {
        let client = client(&self.pool, RepoError::Count(Entity::Association)).await?;
        let statement = client
            .prepare_typed_cached(COUNT_ASSOCIATIONS.query, COUNT_ASSOCIATIONS.types)
            .await
            .change_context(RepoError::Count(Entity::Association))?;

        let total: i64 = client
            .query_one(&statement, &[&residence_id.into_inner()])
            .await
            .change_context(RepoError::Count(Entity::Association))?
            .get("total");
        Ok(total.unsigned_abs())
    }

    async fn find(
        &self,
        profile_id: ProfileId,
        residence_id: ResidenceId,
    ) -> OptRepoResult<Association> {
        let client = client(&self.pool, RepoError::Get(Entity::Association)).await?;
        let statement = client
            .prepare_typed_cached(FIND_ASSOCIATION.query, FIND_ASSOCIATION.types)
            .await
            .change_context(RepoError::Get(Entity::Association))?;

        let association = client
            .query_opt(
                &statement,
                &[&profile_id.into_inner(), &residence_id.into_inner()],
            )
            .await
            .change_context(RepoError::Get(Entity::Association))?
            .map(row_to_association);
        Ok(association)
    }

    async fn create(&self, new_association: NewAssociation) -> RepoResult<Association> {
        let on_err = RepoError::Create(Entity::Association, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(CREATE_ASSOCIATION.query, CREATE_ASSOCIATION.types)
            .await
            .change_context(on_err)?;

        let terms = new_association.terms;
        client
            .query_one(
                &statement,
                &[
                    &AssociationId::new().into_inner(),
                    &new_association.profile_id.into_inner(),
                    &new_association.residence_id.into_inner(),
                    &encode_role(terms.role),
                    &terms.principal,
                    &terms.verified,
                ],
            )
            .await
            .map(row_to_association)
            .map_err(|e| write_failed(e, RepoError::Create, Entity::Association))
    }

    async fn for_residence(&self, residence_id: ResidenceId) -> RepoResult<Vec<Association>> {
        let client = client(&self.pool, RepoError::List(Entity::Association)).await?;
        let statement = client
            .prepare_typed_cached(RESIDENCE_ASSOCIATIONS.query, RESIDENCE_ASSOCIATIONS.types)
            .await
            .change_context(RepoError::List(Entity::Association))?;

        let rows = client
            .query(&statement, &[&residence_id.into_inner()])
            .await
            .change_context(RepoError::List(Entity::Association))?;
        Ok(rows.into_iter().map(row_to_association).collect())
    }

    async fn for_profile(&self, profile_id: ProfileId) -> RepoResult<Vec<Association>> {
        let client = client(&self.pool, RepoError::List(Entity::Association)).await?;
        let statement = client
            .prepare_typed_cached(PROFILE_ASSOCIATIONS.query, PROFILE_ASSOCIATIONS.types)
            .await
            .change_context(RepoError::List(Entity::Association))?;

        let rows = client
            .query(&statement, &[&profile_id.into_inner()])
            .await
            .change_context(RepoError::List(Entity::Association))?;
        Ok(rows.into_iter().map(row_to_association).collect())
    }

    async fn verify(
        &self,
        profile_id: ProfileId,
        residence_id: ResidenceId,
    ) -> OptRepoResult<Association> {
        let on_err = RepoError::Update(Entity::Association, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(VERIFY_ASSOCIATION.query, VERIFY_ASSOCIATION.types)
            .await
            .change_context(on_err)?;

        client
            .query_opt(
                &statement,
                &[&profile_id.into_inner(), &residence_id.into_inner()],
            )
            .await
            .map(|row| row.map(row_to_association))
            .map_err(|e| write_failed(e, RepoError::Update, Entity::Association))
    }
}
