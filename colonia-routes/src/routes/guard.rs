use crate::routes::responses::ApiError;
use crate::session::{AuthProvider, ResolveError, SessionStore};
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, instrument};

const BEARER: &str = "Bearer ";

/// Rejects requests without a valid, unrevoked bearer token. Accepted requests carry
/// their [`crate::session::SessionContext`] in the extensions for the handlers.
#[instrument(skip_all)]
pub async fn require_session<A: AuthProvider>(
    State(sessions): State<SessionStore<A>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER))
        .map(str::trim);

    let Some(token) = token else {
        debug!("request without a bearer token");
        return ApiError::unauthorized("a bearer token is required").into_response();
    };

    match sessions.resolve(token).await {
        Ok(context) => {
            debug!("session resolved for {}", context.profile_id);
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e @ (ResolveError::InvalidToken | ResolveError::Revoked)) => {
            ApiError::unauthorized(e.to_string()).into_response()
        }
    }
}
