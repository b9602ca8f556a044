use colonia_core::ColoniaEngine;
use colonia_core::result::{Entity, Reason, RepoError, RepoResult};
use deadpool_postgres::{Object, Pool};
use error_stack::{IntoReport, Report, ResultExt};
use tokio_postgres::error::SqlState;

pub mod announcements;
pub mod associations;
pub mod communities;
pub mod initializer;
pub mod profiles;
pub mod residences;
mod statements;
pub mod visits;

pub use initializer::{RepoCreationErr, RepoCreator};

pub enum ConnectionDetails {
    Url(String),
}

#[derive(Debug, thiserror::Error)]
#[error("failed to run postgres migrations")]
pub struct RepoMigrationErr;

/// Postgres backed repositories. Every repository handed out shares the same connection pool.
#[derive(Clone)]
pub struct PgEngine {
    pool: Pool,
}

impl PgEngine {
    pub(crate) fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl ColoniaEngine for PgEngine {
    type Profiles = profiles::ProfileRepo;
    type Communities = communities::CommunityRepo;
    type Residences = residences::ResidenceRepo;
    type Associations = associations::AssociationRepo;
    type Visits = visits::VisitRepo;
    type Announcements = announcements::AnnouncementRepo;

    fn profiles(&self) -> Self::Profiles {
        profiles::ProfileRepo::new(self.pool.clone())
    }

    fn communities(&self) -> Self::Communities {
        communities::CommunityRepo::new(self.pool.clone())
    }

    fn residences(&self) -> Self::Residences {
        residences::ResidenceRepo::new(self.pool.clone())
    }

    fn associations(&self) -> Self::Associations {
        associations::AssociationRepo::new(self.pool.clone())
    }

    fn visits(&self) -> Self::Visits {
        visits::VisitRepo::new(self.pool.clone())
    }

    fn announcements(&self) -> Self::Announcements {
        announcements::AnnouncementRepo::new(self.pool.clone())
    }
}

async fn client(pool: &Pool, on_err: RepoError) -> RepoResult<Object> {
    pool.get().await.change_context(on_err)
}

fn reason(e: &tokio_postgres::Error) -> Reason {
    match e.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => Reason::Duplicate,
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => Reason::MissingReference,
        _ => Reason::Db,
    }
}

/// Maps a failed insert/update onto the repo error, keeping constraint violations distinguishable
fn write_failed(
    e: tokio_postgres::Error,
    kind: fn(Entity, Reason) -> RepoError,
    entity: Entity,
) -> Report<RepoError> {
    let reason = reason(&e);
    e.into_report().change_context(kind(entity, reason))
}
