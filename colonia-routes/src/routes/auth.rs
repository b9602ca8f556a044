use crate::error::EndpointError;
use crate::routes::extract::ApiJson;
use crate::routes::requests::{RefreshRequest, SignInRequest, SignUpRequest};
use crate::routes::responses::{ApiError, ApiResponse, SignOutResponse, SignUpResponse};
use crate::service::IdentityService;
use crate::session::{AuthProvider, ProviderOutcome, Session, SessionContext};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use colonia_core::ColoniaEngine;
use tracing::instrument;

pub const SIGN_IN_PATH: &str = "/auth/sign-in";
pub const SIGN_UP_PATH: &str = "/auth/sign-up";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const SIGN_OUT_PATH: &str = "/auth/sign-out";

/// Exchange an email and password for a session
#[utoipa::path(
    post,
    path = SIGN_IN_PATH,
    responses(
        (status = OK, description = "Signed in", body = ApiResponse<Session>),
        (status = UNAUTHORIZED, description = "The credentials were refused", body = ApiError),
    ),
    request_body = SignInRequest
)]
#[instrument(skip_all, err(Debug))]
pub async fn sign_in<E: ColoniaEngine, A: AuthProvider>(
    State(service): State<IdentityService<E, A>>,
    ApiJson(request): ApiJson<SignInRequest>,
) -> Result<Response, EndpointError> {
    let res = match service.sign_in(&request.email, &request.password).await? {
        ProviderOutcome::Success(session) => ApiResponse::ok(session).into_response(),
        ProviderOutcome::Rejected(message) => ApiError::unauthorized(message).into_response(),
    };
    Ok(res)
}

/// Register a new account. A resident profile is created alongside it.
#[utoipa::path(
    post,
    path = SIGN_UP_PATH,
    responses(
        (status = CREATED, description = "The account was created", body = ApiResponse<SignUpResponse>),
        (status = BAD_REQUEST, description = "The auth provider refused the registration", body = ApiError),
    ),
    request_body = SignUpRequest
)]
#[instrument(skip_all, err(Debug))]
pub async fn sign_up<E: ColoniaEngine, A: AuthProvider>(
    State(service): State<IdentityService<E, A>>,
    ApiJson(request): ApiJson<SignUpRequest>,
) -> Result<Response, EndpointError> {
    let outcome = service
        .sign_up(
            &request.email,
            &request.password,
            request.first_name,
            request.last_name,
        )
        .await?;

    let res = match outcome {
        ProviderOutcome::Success(sign_up) => {
            ApiResponse::created(SignUpResponse::from(sign_up)).into_response()
        }
        ProviderOutcome::Rejected(message) => ApiError::bad_request(message).into_response(),
    };
    Ok(res)
}

/// Trade a refresh token for a new session
#[utoipa::path(
    post,
    path = REFRESH_PATH,
    responses(
        (status = OK, description = "The session was refreshed", body = ApiResponse<Session>),
        (status = UNAUTHORIZED, description = "The refresh token was refused", body = ApiError),
    ),
    request_body = RefreshRequest
)]
#[instrument(skip_all, err(Debug))]
pub async fn refresh<E: ColoniaEngine, A: AuthProvider>(
    State(service): State<IdentityService<E, A>>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<Response, EndpointError> {
    let res = match service.refresh(&request.refresh_token).await? {
        ProviderOutcome::Success(session) => ApiResponse::ok(session).into_response(),
        ProviderOutcome::Rejected(message) => ApiError::unauthorized(message).into_response(),
    };
    Ok(res)
}

/// End the caller's session. The token stops being accepted right away.
#[utoipa::path(
    post,
    path = SIGN_OUT_PATH,
    responses(
        (status = OK, description = "Signed out", body = ApiResponse<SignOutResponse>),
        (status = UNAUTHORIZED, description = "No valid session", body = ApiError),
    )
)]
#[instrument(skip_all)]
pub async fn sign_out<E: ColoniaEngine, A: AuthProvider>(
    State(service): State<IdentityService<E, A>>,
    Extension(context): Extension<SessionContext>,
) -> Response {
    let provider_confirmed = matches!(
        service.sign_out(&context).await,
        ProviderOutcome::Success(())
    );
    ApiResponse::ok(SignOutResponse { provider_confirmed }).into_response()
}
