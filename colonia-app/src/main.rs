use apps::{AppError, AppProperties, AppResult};
use axum::Router;
use colonia_routes::session::{AuthConfig, GoTrueClient, SessionEvent, SessionStore};
use colonia_routes::state::AppState;
use config::AppConfig;
use dotenv::dotenv;
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use repositories::postgres::{ConnectionDetails, PgEngine, RepoCreator};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("colonia service shutting down"),
        Err(e) => {
            error!("colonia service exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("COLONIA_LOG"))
        .init();
}

async fn try_main() -> AppResult<()> {
    init_logging();

    if let Err(e) = dotenv() {
        warn!("failed to load .env file: {e}");
    }

    let config = AppConfig::from_env().change_context(AppError)?;
    debug!("starting with {config:?}");

    let port = config.port;
    let routes = build_routes(config).await?;

    apps::run(routes, AppProperties { port }).await
}

async fn build_routes(config: AppConfig) -> AppResult<Router> {
    let engine = build_engine(&config).await?;
    let sessions = build_sessions()?;
    tokio::spawn(log_session_events(sessions.subscribe()));

    debug!("building routes..");
    let app_state = if config.metrics_enabled {
        AppState::new_with_metrics(engine, sessions)
    } else {
        AppState::new_without_metrics(engine, sessions)
    };
    Ok(colonia_routes::routes::build(app_state)).inspect(|_| debug!("routes built"))
}

#[instrument(skip_all)]
async fn build_engine(config: &AppConfig) -> AppResult<PgEngine> {
    debug!("initializing repository");
    RepoCreator::default()
        .with_pool_size(config.pool_size)
        .create(ConnectionDetails::Url(config.database_url.clone()))
        .await
        .change_context(AppError)
}

fn build_sessions() -> AppResult<SessionStore<GoTrueClient>> {
    let auth = AuthConfig::from_env().change_context(AppError)?;
    debug!("using auth provider {auth:?}");

    Ok(SessionStore::new(
        GoTrueClient::new(&auth),
        &auth.jwt_secret,
        &auth.audience,
    ))
}

async fn log_session_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::SignedIn(id)) => info!("{id} signed in"),
            Ok(SessionEvent::SignedUp(id)) => info!("{id} signed up"),
            Ok(SessionEvent::SignedOut(id)) => info!("{id} signed out"),
            Ok(SessionEvent::TokenRefreshed(id)) => debug!("{id} refreshed their session"),
            Err(RecvError::Lagged(missed)) => warn!("session event log skipped {missed} events"),
            Err(RecvError::Closed) => break,
        }
    }
}
