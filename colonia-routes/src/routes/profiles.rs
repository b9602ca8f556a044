use crate::error::EndpointError;
use crate::routes::responses::{ApiError, ApiResponse};
use crate::service::{IdentityService, ProfileView};
use crate::session::{AuthProvider, SessionContext};
use axum::Extension;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use colonia_core::ColoniaEngine;
use tracing::instrument;

pub const PROFILE_ME_PATH: &str = "/usuarios/me";

/// The profile of the caller, with its role label
#[utoipa::path(
    get,
    path = PROFILE_ME_PATH,
    responses(
        (status = OK, description = "The caller's profile", body = ApiResponse<ProfileView>),
        (status = NOT_FOUND, description = "The caller has no profile yet", body = ApiError),
    )
)]
#[instrument(skip_all, err(Debug))]
pub async fn get_me<E: ColoniaEngine, A: AuthProvider>(
    State(service): State<IdentityService<E, A>>,
    Extension(context): Extension<SessionContext>,
) -> Result<Response, EndpointError> {
    Ok(service
        .profile(&context)
        .await?
        .map(|p| ApiResponse::ok(p).into_response())
        .unwrap_or_else(|| ApiError::not_found("profile").into_response()))
}
