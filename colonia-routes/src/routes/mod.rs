use crate::metrics;
use crate::session::AuthProvider;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use colonia_core::ColoniaEngine;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

mod announcements;
mod auth;
mod communities;
mod extract;
mod guard;
mod profiles;
mod requests;
mod residences;
pub mod responses;
mod visits;

#[derive(OpenApi)]
#[openapi(paths(
    auth::sign_in,
    auth::sign_up,
    auth::refresh,
    auth::sign_out,
    profiles::get_me,
    communities::list_communities,
    communities::create_community,
    communities::get_community,
    communities::join_community,
    communities::community_residences,
    residences::create_residence,
    residences::bulk_create_residences,
    residences::my_residences,
    residences::get_residence,
    residences::claim_residence,
    residences::residence_associations,
    residences::verify_association,
    residences::residence_visits,
    visits::register_visit,
    visits::get_visit,
    visits::set_visit_active,
    announcements::active_announcements,
    announcements::create_announcement,
    announcements::get_announcement,
    announcements::update_announcement,
    announcements::delete_announcement,
))]
struct ApiDoc;

const METRICS_PATH: &str = "/metrics";

pub fn build<E: ColoniaEngine, A: AuthProvider>(app_state: AppState<E, A>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes(app_state))
        .split_for_parts();

    router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
}

fn routes<S, E, A>(app_state: AppState<E, A>) -> OpenApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
    E: ColoniaEngine,
    A: AuthProvider,
{
    let public = OpenApiRouter::new()
        .route(auth::SIGN_IN_PATH, post(auth::sign_in::<E, A>))
        .route(auth::SIGN_UP_PATH, post(auth::sign_up::<E, A>))
        .route(auth::REFRESH_PATH, post(auth::refresh::<E, A>));

    let protected = OpenApiRouter::new()
        .route(auth::SIGN_OUT_PATH, post(auth::sign_out::<E, A>))
        .route(profiles::PROFILE_ME_PATH, get(profiles::get_me::<E, A>))
        .route(
            communities::COMMUNITY_LIST_PATH,
            get(communities::list_communities::<E>),
        )
        .route(
            communities::COMMUNITY_CREATE_PATH,
            post(communities::create_community::<E>),
        )
        .route(
            communities::COMMUNITY_GET_PATH,
            get(communities::get_community::<E>),
        )
        .route(
            communities::COMMUNITY_JOIN_PATH,
            post(communities::join_community::<E>),
        )
        .route(
            communities::COMMUNITY_RESIDENCES_PATH,
            get(communities::community_residences::<E>),
        )
        .route(
            residences::RESIDENCE_CREATE_PATH,
            post(residences::create_residence::<E>),
        )
        .route(
            residences::RESIDENCE_BULK_CREATE_PATH,
            post(residences::bulk_create_residences::<E>),
        )
        .route(
            residences::RESIDENCE_MINE_PATH,
            get(residences::my_residences::<E>),
        )
        .route(
            residences::RESIDENCE_GET_PATH,
            get(residences::get_residence::<E>),
        )
        .route(
            residences::RESIDENCE_CLAIM_PATH,
            post(residences::claim_residence::<E>),
        )
        .route(
            residences::RESIDENCE_ASSOCIATIONS_PATH,
            get(residences::residence_associations::<E>),
        )
        .route(
            residences::RESIDENCE_VERIFY_PATH,
            patch(residences::verify_association::<E>),
        )
        .route(
            residences::RESIDENCE_VISITS_PATH,
            get(residences::residence_visits::<E>),
        )
        .route(visits::VISIT_REGISTER_PATH, post(visits::register_visit::<E>))
        .route(visits::VISIT_GET_PATH, get(visits::get_visit::<E>))
        .route(
            visits::VISIT_ACTIVE_PATH,
            patch(visits::set_visit_active::<E>),
        )
        .route(
            announcements::ANNOUNCEMENT_LIST_PATH,
            get(announcements::active_announcements::<E>),
        )
        .route(
            announcements::ANNOUNCEMENT_CREATE_PATH,
            post(announcements::create_announcement::<E>),
        )
        .route(
            announcements::ANNOUNCEMENT_PATH,
            get(announcements::get_announcement::<E>)
                .put(announcements::update_announcement::<E>)
                .delete(announcements::delete_announcement::<E>),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.sessions.clone(),
            guard::require_session::<A>,
        ));

    let main_router = public.merge(protected);

    let recorder = if app_state.metrics_enabled {
        match metrics::setup_recorder() {
            Ok(recorder) => Some(recorder),
            Err(e) => {
                error!("metrics could not be set up, serving without them: {e:?}");
                None
            }
        }
    } else {
        None
    };

    let router = if let Some(recorder) = recorder {
        info!("metrics enabled, setting up metrics handler");
        main_router
            .route(METRICS_PATH, get(|| async move { recorder.render() }))
            .route_layer(middleware::from_fn(metrics::track_http))
    } else {
        info!("metrics not enabled, setting up service unavailable metrics handler");
        main_router.route(
            METRICS_PATH,
            get(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
                )
            }),
        )
    };

    router.with_state(app_state)
}
