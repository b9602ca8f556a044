use crate::routes::responses::ApiError;
use axum::response::{IntoResponse, Response};
use error_stack::Report;
use tracing::error;

#[derive(Debug, thiserror::Error)]
#[error("colonia service error")]
pub struct ServiceError;

/// Returned by endpoints when a service call fails outright. The full report is logged,
/// the caller only sees a generic 500 envelope.
#[derive(thiserror::Error)]
#[error("there was an error running the endpoint")]
pub struct EndpointError(Report<ServiceError>);

impl std::fmt::Debug for EndpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Report<ServiceError>> for EndpointError {
    fn from(value: Report<ServiceError>) -> Self {
        Self(value)
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        error!("request failed: {:?}", self.0);
        ApiError::internal().into_response()
    }
}
