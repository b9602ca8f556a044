use crate::postgres::statements::{CREATE_VISIT, GET_VISIT, LIST_RESIDENCE_VISITS, SET_VISIT_ACTIVE};
use crate::postgres::{client, write_failed};
use colonia_core::ids::{ProfileId, ResidenceId, VisitId};
use colonia_core::model::{NewVisit, Visit, VisitType};
use colonia_core::repository::VisitRepository;
use colonia_core::result::{Entity, OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::ResultExt;
use std::borrow::Borrow;
use tokio_postgres::Row;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct VisitRepo {
    pool: Pool,
}

impl VisitRepo {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn encode_type(visit_type: VisitType) -> &'static str {
    match visit_type {
        VisitType::Visit => "Visita",
        VisitType::Service => "Servicio",
        VisitType::Recurring => "Recurrente",
    }
}

fn decode_type(tipo: &str) -> VisitType {
    match tipo.trim().to_lowercase().as_str() {
        "visita" | "visit" => VisitType::Visit,
        "servicio" | "service" => VisitType::Service,
        "recurrente" | "recurring" => VisitType::Recurring,
        other => {
            warn!("unrecognised visit type '{other}', treating it as a regular visit");
            VisitType::Visit
        }
    }
}

fn row_to_visit(row: impl Borrow<Row>) -> Visit {
    let row = row.borrow();
    Visit {
        id: VisitId::from(row.get::<_, Uuid>("id")),
        visitor_name: row.get("nombre_visitante"),
        visitor_surname: row.get("apellido_visitante"),
        visitor_doc_id: row.get("identificacion"),
        visit_type: decode_type(row.get("tipo")),
        scheduled_at: row.get("fecha_programada"),
        residence_id: ResidenceId::from(row.get::<_, Uuid>("residencia_id")),
        created_by: ProfileId::from(row.get::<_, Uuid>("usuario_id")),
        active: row.get("activa"),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    }
}

impl VisitRepository for VisitRepo {
    async fn create(&self, new_visit: NewVisit) -> RepoResult<Visit> {
        let on_err = RepoError::Create(Entity::Visit, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(CREATE_VISIT.query, CREATE_VISIT.types)
            .await
            .change_context(on_err)?;

        client
            .query_one(
                &statement,
                &[
                    &VisitId::new().into_inner(),
                    &new_visit.visitor_name,
                    &new_visit.visitor_surname,
                    &new_visit.visitor_doc_id,
                    &encode_type(new_visit.visit_type),
                    &new_visit.scheduled_at,
                    &new_visit.residence_id.into_inner(),
                    &new_visit.created_by.into_inner(),
                    &new_visit.active,
                ],
            )
            .await
            .map(row_to_visit)
            .map_err(|e| write_failed(e, RepoError::Create, Entity::Visit))
    }

    async fn get(&self, id: VisitId) -> OptRepoResult<Visit> {
        let client = client(&self.pool, RepoError::Get(Entity::Visit)).await?;
        let statement = client
            .prepare_typed_cached(GET_VISIT.query, GET_VISIT.types)
            .await
            .change_context(RepoError::Get(Entity::Visit))?;

        let visit = client
            .query_opt(&statement, &[&id.into_inner()])
            .await
            .change_context(RepoError::Get(Entity::Visit))?
            .map(row_to_visit);
        Ok(visit)
    }

    async fn list_by_residence(&self, residence_id: ResidenceId) -> RepoResult<Vec<Visit>> {
        let client = client(&self.pool, RepoError::List(Entity::Visit)).await?;
        let statement = client
            .prepare_typed_cached(LIST_RESIDENCE_VISITS.query, LIST_RESIDENCE_VISITS.types)
            .await
            .change_context(RepoError::List(Entity::Visit))?;

        let rows = client
            .query(&statement, &[&residence_id.into_inner()])
            .await
            .change_context(RepoError::List(Entity::Visit))?;
        Ok(rows.into_iter().map(row_to_visit).collect())
    }

    async fn set_active(&self, id: VisitId, active: bool) -> OptRepoResult<Visit> {
        let on_err = RepoError::Update(Entity::Visit, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(SET_VISIT_ACTIVE.query, SET_VISIT_ACTIVE.types)
            .await
            .change_context(on_err)?;

        client
            .query_opt(&statement, &[&id.into_inner(), &active])
            .await
            .map(|row| row.map(row_to_visit))
            .map_err(|e| write_failed(e, RepoError::Update, Entity::Visit))
    }
}
