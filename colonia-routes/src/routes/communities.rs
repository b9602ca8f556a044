use crate::error::EndpointError;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::requests::CreateCommunityRequest;
use crate::routes::responses::{ApiError, ApiResponse};
use crate::service::{CommunityService, CreateCommunityOutcome, JoinOutcome};
use crate::session::SessionContext;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use colonia_core::ColoniaEngine;
use colonia_core::ids::CommunityId;
use colonia_core::model::{Community, Profile, Residence};
use tracing::instrument;

pub const COMMUNITY_LIST_PATH: &str = "/colonias/";
pub const COMMUNITY_CREATE_PATH: &str = "/colonias/";
pub const COMMUNITY_GET_PATH: &str = "/colonias/{community_id}";
pub const COMMUNITY_JOIN_PATH: &str = "/colonias/{community_id}/join";
pub const COMMUNITY_RESIDENCES_PATH: &str = "/colonias/{community_id}/residencias";

/// Every registered community, by name
#[utoipa::path(
    get,
    path = COMMUNITY_LIST_PATH,
    responses(
        (status = OK, description = "All communities", body = ApiResponse<Vec<Community>>),
    )
)]
#[instrument(skip_all, err(Debug))]
pub async fn list_communities<E: ColoniaEngine>(
    State(service): State<CommunityService<E>>,
) -> Result<Response, EndpointError> {
    Ok(ApiResponse::ok(service.list().await?).into_response())
}

/// Register a community. The caller becomes its administrator.
#[utoipa::path(
    post,
    path = COMMUNITY_CREATE_PATH,
    responses(
        (status = CREATED, description = "The community was created", body = ApiResponse<Community>),
        (status = UNPROCESSABLE_ENTITY, description = "Name or address was blank", body = ApiError),
        (status = NOT_FOUND, description = "The caller has no profile", body = ApiError),
    ),
    request_body = CreateCommunityRequest
)]
#[instrument(skip_all, err(Debug), fields(req.name = request.name))]
pub async fn create_community<E: ColoniaEngine>(
    State(service): State<CommunityService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiJson(request): ApiJson<CreateCommunityRequest>,
) -> Result<Response, EndpointError> {
    let res = match service
        .create(&context, request.name, request.address)
        .await?
    {
        CreateCommunityOutcome::Created(community) => {
            ApiResponse::created(community).into_response()
        }
        CreateCommunityOutcome::Invalid(message) => {
            ApiError::unprocessable(message).into_response()
        }
        CreateCommunityOutcome::ProfileNotFound => ApiError::not_found("profile").into_response(),
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = COMMUNITY_GET_PATH,
    responses(
        (status = OK, description = "The community was found", body = ApiResponse<Community>),
        (status = NOT_FOUND, description = "No community has the given id", body = ApiError),
    ),
    params(
        ("community_id" = String, Path, description = "The community to find"),
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn get_community<E: ColoniaEngine>(
    State(service): State<CommunityService<E>>,
    ApiPath(community_id): ApiPath<CommunityId>,
) -> Result<Response, EndpointError> {
    Ok(service
        .get(community_id)
        .await?
        .map(|c| ApiResponse::ok(c).into_response())
        .unwrap_or_else(|| ApiError::not_found("community").into_response()))
}

/// Make the community the caller's own
#[utoipa::path(
    post,
    path = COMMUNITY_JOIN_PATH,
    responses(
        (status = OK, description = "The caller's updated profile", body = ApiResponse<Profile>),
        (status = NOT_FOUND, description = "The community or the caller's profile does not exist", body = ApiError),
    ),
    params(
        ("community_id" = String, Path, description = "The community to join"),
    )
)]
#[instrument(skip(service, context), err(Debug))]
pub async fn join_community<E: ColoniaEngine>(
    State(service): State<CommunityService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath(community_id): ApiPath<CommunityId>,
) -> Result<Response, EndpointError> {
    let res = match service.join(&context, community_id).await? {
        JoinOutcome::Joined(profile) => ApiResponse::ok(profile).into_response(),
        JoinOutcome::CommunityNotFound => ApiError::not_found("community").into_response(),
        JoinOutcome::ProfileNotFound => ApiError::not_found("profile").into_response(),
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = COMMUNITY_RESIDENCES_PATH,
    responses(
        (status = OK, description = "Residences of the community, by street and number", body = ApiResponse<Vec<Residence>>),
        (status = NOT_FOUND, description = "No community has the given id", body = ApiError),
    ),
    params(
        ("community_id" = String, Path, description = "The community whose residences to list"),
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn community_residences<E: ColoniaEngine>(
    State(service): State<CommunityService<E>>,
    ApiPath(community_id): ApiPath<CommunityId>,
) -> Result<Response, EndpointError> {
    Ok(service
        .residences(community_id)
        .await?
        .map(|r| ApiResponse::ok(r).into_response())
        .unwrap_or_else(|| ApiError::not_found("community").into_response()))
}
