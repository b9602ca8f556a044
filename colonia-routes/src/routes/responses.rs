use crate::session::{Identity, Session, SignUp};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use colonia_core::claim::ClaimKind;
use colonia_core::model::{Association, Residence};
use serde::Serialize;
use std::borrow::Cow;
use utoipa::ToSchema;

pub type ErrorMessageType = Cow<'static, str>;

/// Envelope every endpoint answers with. Successful responses carry `data`,
/// failed ones carry `error`; `status` repeats the http status code.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status_code: StatusCode,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    error: Option<ErrorMessageType>,
    status: u16,
}

pub type ApiError = ApiResponse<()>;

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::success(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::success(StatusCode::CREATED, data)
    }

    fn success(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code,
            success: true,
            data: Some(data),
            error: None,
            status: status_code.as_u16(),
        }
    }
}

impl ApiError {
    pub fn new(status_code: StatusCode, message: impl Into<ErrorMessageType>) -> Self {
        Self {
            status_code,
            success: false,
            data: None,
            error: Some(message.into()),
            status: status_code.as_u16(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn bad_request(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn forbidden(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unauthorized(message: impl Into<ErrorMessageType>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "an unexpected error occurred, try again later",
        )
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub association: Association,
    /// Tells the claimant what happens next with their request
    pub message: &'static str,
}

impl ClaimResponse {
    pub fn new(association: Association, kind: ClaimKind) -> Self {
        Self {
            association,
            message: kind.message(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCreateResponse {
    created: usize,
    residences: Vec<Residence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl BulkCreateResponse {
    pub fn new(residences: Vec<Residence>, warning: Option<String>) -> Self {
        Self {
            created: residences.len(),
            residences,
            warning,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignUpResponse {
    user: Identity,
    /// Missing when the email address has to be confirmed before signing in
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<Session>,
    confirmation_required: bool,
}

impl From<SignUp> for SignUpResponse {
    fn from(value: SignUp) -> Self {
        Self {
            confirmation_required: value.session.is_none(),
            user: value.identity,
            session: value.session,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignOutResponse {
    /// `false` when the auth provider did not confirm, the session is rejected here either way
    pub provider_confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_has_data_and_no_error() {
        let value = serde_json::to_value(ApiResponse::created(vec![1, 2])).unwrap();

        assert_eq!(json!({"success": true, "data": [1, 2], "status": 201}), value);
    }

    #[test]
    fn error_envelope_has_error_and_no_data() {
        let value = serde_json::to_value(ApiError::conflict("already associated")).unwrap();

        assert_eq!(
            json!({"success": false, "error": "already associated", "status": 409}),
            value
        );
    }

    #[test]
    fn envelope_status_matches_response_status() {
        let response = ApiError::not_found("residence").into_response();

        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }
}
