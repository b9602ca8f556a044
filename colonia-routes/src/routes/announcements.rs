use crate::error::EndpointError;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::requests::{CreateAnnouncementRequest, UpdateAnnouncementRequest};
use crate::routes::responses::{ApiError, ApiResponse};
use crate::service::{
    ActiveAnnouncementsOutcome, AnnouncementService, ChangeAnnouncementOutcome,
    CreateAnnouncementOutcome, GetAnnouncementOutcome,
};
use crate::session::SessionContext;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use colonia_core::ColoniaEngine;
use colonia_core::ids::AnnouncementId;
use colonia_core::model::Announcement;
use tracing::instrument;

pub const ANNOUNCEMENT_LIST_PATH: &str = "/anuncios/";
pub const ANNOUNCEMENT_CREATE_PATH: &str = "/anuncios/";
pub const ANNOUNCEMENT_PATH: &str = "/anuncios/{announcement_id}";

fn change_response(outcome: ChangeAnnouncementOutcome<Announcement>) -> Response {
    match outcome {
        ChangeAnnouncementOutcome::Changed(announcement) => {
            ApiResponse::ok(announcement).into_response()
        }
        ChangeAnnouncementOutcome::Invalid(message) => {
            ApiError::unprocessable(message).into_response()
        }
        ChangeAnnouncementOutcome::NotFound => ApiError::not_found("announcement").into_response(),
        ChangeAnnouncementOutcome::ProfileNotFound => {
            ApiError::not_found("profile").into_response()
        }
        ChangeAnnouncementOutcome::NotAdministrator => {
            ApiError::forbidden("only an administrator of the community can change announcements")
                .into_response()
        }
    }
}

/// Unexpired announcements of the caller's community, important ones first, then newest.
/// Callers without a community get an empty list.
#[utoipa::path(
    get,
    path = ANNOUNCEMENT_LIST_PATH,
    responses(
        (status = OK, description = "Active announcements", body = ApiResponse<Vec<Announcement>>),
        (status = NOT_FOUND, description = "The caller has no profile", body = ApiError),
    )
)]
#[instrument(skip_all, err(Debug))]
pub async fn active_announcements<E: ColoniaEngine>(
    State(service): State<AnnouncementService<E>>,
    Extension(context): Extension<SessionContext>,
) -> Result<Response, EndpointError> {
    let res = match service.active(&context).await? {
        ActiveAnnouncementsOutcome::Announcements(announcements) => {
            ApiResponse::ok(announcements).into_response()
        }
        ActiveAnnouncementsOutcome::NoCommunity => {
            ApiResponse::ok(Vec::<Announcement>::new()).into_response()
        }
        ActiveAnnouncementsOutcome::ProfileNotFound => {
            ApiError::not_found("profile").into_response()
        }
    };
    Ok(res)
}

/// Publish an announcement to the community the caller administers
#[utoipa::path(
    post,
    path = ANNOUNCEMENT_CREATE_PATH,
    responses(
        (status = CREATED, description = "The announcement was published", body = ApiResponse<Announcement>),
        (status = UNPROCESSABLE_ENTITY, description = "Title or body was blank", body = ApiError),
        (status = FORBIDDEN, description = "The caller is not an administrator of a community", body = ApiError),
        (status = NOT_FOUND, description = "The caller has no profile", body = ApiError),
    ),
    request_body = CreateAnnouncementRequest
)]
#[instrument(skip_all, err(Debug), fields(req.important = request.important))]
pub async fn create_announcement<E: ColoniaEngine>(
    State(service): State<AnnouncementService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiJson(request): ApiJson<CreateAnnouncementRequest>,
) -> Result<Response, EndpointError> {
    let outcome = service
        .create(
            &context,
            request.title,
            request.body,
            request.important,
            request.expires_at,
        )
        .await?;

    let res = match outcome {
        CreateAnnouncementOutcome::Created(announcement) => {
            ApiResponse::created(announcement).into_response()
        }
        CreateAnnouncementOutcome::Invalid(message) => {
            ApiError::unprocessable(message).into_response()
        }
        CreateAnnouncementOutcome::ProfileNotFound => {
            ApiError::not_found("profile").into_response()
        }
        CreateAnnouncementOutcome::NotAdministrator => {
            ApiError::forbidden("only a community administrator can publish announcements")
                .into_response()
        }
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = ANNOUNCEMENT_PATH,
    responses(
        (status = OK, description = "The announcement was found", body = ApiResponse<Announcement>),
        (status = FORBIDDEN, description = "The announcement belongs to another community", body = ApiError),
        (status = NOT_FOUND, description = "No announcement has the given id", body = ApiError),
    ),
    params(
        ("announcement_id" = String, Path, description = "The announcement to find"),
    )
)]
#[instrument(skip(service, context), err(Debug))]
pub async fn get_announcement<E: ColoniaEngine>(
    State(service): State<AnnouncementService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath(announcement_id): ApiPath<AnnouncementId>,
) -> Result<Response, EndpointError> {
    let res = match service.get(&context, announcement_id).await? {
        GetAnnouncementOutcome::Found(announcement) => ApiResponse::ok(announcement).into_response(),
        GetAnnouncementOutcome::NotFound => ApiError::not_found("announcement").into_response(),
        GetAnnouncementOutcome::ProfileNotFound => ApiError::not_found("profile").into_response(),
        GetAnnouncementOutcome::OtherCommunity => {
            ApiError::forbidden("the announcement belongs to another community").into_response()
        }
    };
    Ok(res)
}

/// Change the given fields of an announcement of the community the caller administers
#[utoipa::path(
    put,
    path = ANNOUNCEMENT_PATH,
    responses(
        (status = OK, description = "The announcement was updated", body = ApiResponse<Announcement>),
        (status = UNPROCESSABLE_ENTITY, description = "Title or body was blank", body = ApiError),
        (status = FORBIDDEN, description = "The caller does not administer the announcement's community", body = ApiError),
        (status = NOT_FOUND, description = "No announcement has the given id", body = ApiError),
    ),
    params(
        ("announcement_id" = String, Path, description = "The announcement to change"),
    ),
    request_body = UpdateAnnouncementRequest
)]
#[instrument(skip(service, context, request), err(Debug))]
pub async fn update_announcement<E: ColoniaEngine>(
    State(service): State<AnnouncementService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath(announcement_id): ApiPath<AnnouncementId>,
    ApiJson(request): ApiJson<UpdateAnnouncementRequest>,
) -> Result<Response, EndpointError> {
    let outcome = service
        .update(&context, announcement_id, request.into())
        .await?;
    Ok(change_response(outcome))
}

/// Remove an announcement, answering with what was removed
#[utoipa::path(
    delete,
    path = ANNOUNCEMENT_PATH,
    responses(
        (status = OK, description = "The announcement was removed", body = ApiResponse<Announcement>),
        (status = FORBIDDEN, description = "The caller does not administer the announcement's community", body = ApiError),
        (status = NOT_FOUND, description = "No announcement has the given id", body = ApiError),
    ),
    params(
        ("announcement_id" = String, Path, description = "The announcement to remove"),
    )
)]
#[instrument(skip(service, context), err(Debug))]
pub async fn delete_announcement<E: ColoniaEngine>(
    State(service): State<AnnouncementService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath(announcement_id): ApiPath<AnnouncementId>,
) -> Result<Response, EndpointError> {
    Ok(change_response(
        service.delete(&context, announcement_id).await?,
    ))
}
