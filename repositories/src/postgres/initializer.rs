use crate::postgres::{ConnectionDetails, PgEngine, RepoMigrationErr};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use error_stack::{Report, ResultExt};
use std::str::FromStr;
use tokio_postgres::{Config, NoTls};
use tracing::{debug, info};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./src/postgres/migrations");
}

#[derive(Debug, thiserror::Error)]
#[error("failed to create repos")]
pub struct RepoCreationErr;

/// Builds the connection pool, brings the schema up to date and hands back the engine
#[derive(Debug, Default)]
pub struct RepoCreator {
    pool_size: Option<usize>,
}

impl RepoCreator {
    pub fn with_pool_size(mut self, pool_size: Option<usize>) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub async fn create(
        self,
        connection_details: ConnectionDetails,
    ) -> Result<PgEngine, Report<RepoCreationErr>> {
        let config = match connection_details {
            ConnectionDetails::Url(url) => {
                Config::from_str(&url).change_context(RepoCreationErr)?
            }
        };

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(config, NoTls, mgr_config);
        let mut pool_builder = Pool::builder(mgr);
        if let Some(pool_size) = self.pool_size {
            pool_builder = pool_builder.max_size(pool_size);
        }
        debug!("building connection pool..");
        let pool = pool_builder.build().change_context(RepoCreationErr)?;
        debug!("connection pool built, running migrations");

        run_migrations(&pool)
            .await
            .change_context(RepoCreationErr)?;

        Ok(PgEngine::new(pool))
    }
}

// the connection is dropped before returning so a pool of size 1 is usable afterwards
async fn run_migrations(pool: &Pool) -> Result<(), Report<RepoMigrationErr>> {
    let mut handle = pool.get().await.change_context(RepoMigrationErr)?;

    let client = &mut **handle;

    let report = embedded::migrations::runner()
        .run_async(client)
        .await
        .change_context(RepoMigrationErr)?;

    info!("{} migrations applied", report.applied_migrations().len());
    Ok(())
}
