use crate::error::EndpointError;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::requests::{RegisterVisitRequest, SetVisitActiveRequest};
use crate::routes::responses::{ApiError, ApiResponse};
use crate::service::{RegisterVisitOutcome, ToggleVisitOutcome, VisitService};
use crate::session::SessionContext;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use colonia_core::ColoniaEngine;
use colonia_core::ids::VisitId;
use colonia_core::model::Visit;
use tracing::instrument;

pub const VISIT_REGISTER_PATH: &str = "/visitas/";
pub const VISIT_GET_PATH: &str = "/visitas/{visit_id}";
pub const VISIT_ACTIVE_PATH: &str = "/visitas/{visit_id}/active";

/// Authorize a visitor for a residence the caller is associated with
#[utoipa::path(
    post,
    path = VISIT_REGISTER_PATH,
    responses(
        (status = CREATED, description = "The visit was registered", body = ApiResponse<Visit>),
        (status = UNPROCESSABLE_ENTITY, description = "A required field was blank or the residence id is malformed", body = ApiError),
        (status = FORBIDDEN, description = "The caller is not associated with the residence", body = ApiError),
        (status = NOT_FOUND, description = "The residence does not exist", body = ApiError),
    ),
    request_body = RegisterVisitRequest
)]
#[instrument(skip_all, err(Debug), fields(req.visit_type = %request.visit_type))]
pub async fn register_visit<E: ColoniaEngine>(
    State(service): State<VisitService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiJson(request): ApiJson<RegisterVisitRequest>,
) -> Result<Response, EndpointError> {
    let res = match service.register(&context, request.into()).await? {
        RegisterVisitOutcome::Registered(visit) => ApiResponse::created(visit).into_response(),
        RegisterVisitOutcome::Invalid(e) => ApiError::unprocessable(e.to_string()).into_response(),
        RegisterVisitOutcome::ResidenceNotFound => {
            ApiError::not_found("residence").into_response()
        }
        RegisterVisitOutcome::NotAssociated => {
            ApiError::forbidden("not associated with this residence").into_response()
        }
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = VISIT_GET_PATH,
    responses(
        (status = OK, description = "The visit was found", body = ApiResponse<Visit>),
        (status = NOT_FOUND, description = "No visit has the given id", body = ApiError),
    ),
    params(
        ("visit_id" = String, Path, description = "The visit to find"),
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn get_visit<E: ColoniaEngine>(
    State(service): State<VisitService<E>>,
    ApiPath(visit_id): ApiPath<VisitId>,
) -> Result<Response, EndpointError> {
    Ok(service
        .get(visit_id)
        .await?
        .map(|v| ApiResponse::ok(v).into_response())
        .unwrap_or_else(|| ApiError::not_found("visit").into_response()))
}

/// Switch a visit authorization on or off. Only whoever registered it may do so.
#[utoipa::path(
    patch,
    path = VISIT_ACTIVE_PATH,
    responses(
        (status = OK, description = "The visit with its new state", body = ApiResponse<Visit>),
        (status = FORBIDDEN, description = "The caller did not register the visit", body = ApiError),
        (status = NOT_FOUND, description = "No visit has the given id", body = ApiError),
    ),
    params(
        ("visit_id" = String, Path, description = "The visit to update"),
    ),
    request_body = SetVisitActiveRequest
)]
#[instrument(skip(service, context, request), err(Debug), fields(req.active = request.active))]
pub async fn set_visit_active<E: ColoniaEngine>(
    State(service): State<VisitService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath(visit_id): ApiPath<VisitId>,
    ApiJson(request): ApiJson<SetVisitActiveRequest>,
) -> Result<Response, EndpointError> {
    let res = match service
        .set_active(&context, visit_id, request.active)
        .await?
    {
        ToggleVisitOutcome::Updated(visit) => ApiResponse::ok(visit).into_response(),
        ToggleVisitOutcome::NotFound => ApiError::not_found("visit").into_response(),
        ToggleVisitOutcome::NotCreator => {
            ApiError::forbidden("only whoever registered the visit can change it").into_response()
        }
    };
    Ok(res)
}
