use crate::error::EndpointError;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::routes::requests::{BulkCreateResidencesRequest, CreateResidenceRequest};
use crate::routes::responses::{ApiError, ApiResponse, BulkCreateResponse, ClaimResponse};
use crate::service::{
    ClaimOutcome, CreateResidencesOutcome, ResidenceService, ResidenceVisitsOutcome,
    VerifyOutcome, VisitService,
};
use crate::session::SessionContext;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use colonia_core::ColoniaEngine;
use colonia_core::ids::{ProfileId, ResidenceId};
use colonia_core::model::{Association, Residence, Visit};
use tracing::instrument;

pub const RESIDENCE_CREATE_PATH: &str = "/residencias/";
pub const RESIDENCE_BULK_CREATE_PATH: &str = "/residencias/bulk";
pub const RESIDENCE_MINE_PATH: &str = "/residencias/mine";
pub const RESIDENCE_GET_PATH: &str = "/residencias/{residence_id}";
pub const RESIDENCE_CLAIM_PATH: &str = "/residencias/{residence_id}/claim";
pub const RESIDENCE_ASSOCIATIONS_PATH: &str = "/residencias/{residence_id}/associations";
pub const RESIDENCE_VERIFY_PATH: &str = "/residencias/{residence_id}/associations/{profile_id}/verify";
pub const RESIDENCE_VISITS_PATH: &str = "/residencias/{residence_id}/visitas";

fn creation_response(
    outcome: CreateResidencesOutcome,
    on_created: impl FnOnce(Vec<Residence>, Option<String>) -> Response,
) -> Response {
    match outcome {
        CreateResidencesOutcome::Created {
            residences,
            warning,
        } => on_created(residences, warning),
        CreateResidencesOutcome::Invalid(message) => ApiError::bad_request(message).into_response(),
        CreateResidencesOutcome::CommunityNotFound => {
            ApiError::not_found("community").into_response()
        }
        CreateResidencesOutcome::ProfileNotFound => ApiError::not_found("profile").into_response(),
        CreateResidencesOutcome::NotAdministrator => {
            ApiError::forbidden("only an administrator of the community can add residences")
                .into_response()
        }
    }
}

/// Add one residence to a community the caller administers
#[utoipa::path(
    post,
    path = RESIDENCE_CREATE_PATH,
    responses(
        (status = CREATED, description = "The residence was created", body = ApiResponse<Residence>),
        (status = BAD_REQUEST, description = "Number or street was blank", body = ApiError),
        (status = FORBIDDEN, description = "The caller does not administer the community", body = ApiError),
        (status = NOT_FOUND, description = "The community does not exist", body = ApiError),
    ),
    request_body = CreateResidenceRequest
)]
#[instrument(skip_all, err(Debug))]
pub async fn create_residence<E: ColoniaEngine>(
    State(service): State<ResidenceService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiJson(request): ApiJson<CreateResidenceRequest>,
) -> Result<Response, EndpointError> {
    let outcome = service
        .create_one(
            &context,
            request.number,
            request.street,
            request.reference,
            request.community_id,
        )
        .await?;
    Ok(creation_response(outcome, |mut residences, _| {
        match residences.pop() {
            Some(residence) => ApiResponse::created(residence).into_response(),
            None => ApiError::internal().into_response(),
        }
    }))
}

/// Add a residence for every number from `start` to `end` on one street.
/// Very wide ranges are created but come back with a warning.
#[utoipa::path(
    post,
    path = RESIDENCE_BULK_CREATE_PATH,
    responses(
        (status = CREATED, description = "The residences were created", body = ApiResponse<BulkCreateResponse>),
        (status = BAD_REQUEST, description = "The range or street is not usable", body = ApiError),
        (status = FORBIDDEN, description = "The caller does not administer the community", body = ApiError),
        (status = NOT_FOUND, description = "The community does not exist", body = ApiError),
    ),
    request_body = BulkCreateResidencesRequest
)]
#[instrument(skip_all, err(Debug), fields(req.start = request.start, req.end = request.end))]
pub async fn bulk_create_residences<E: ColoniaEngine>(
    State(service): State<ResidenceService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiJson(request): ApiJson<BulkCreateResidencesRequest>,
) -> Result<Response, EndpointError> {
    let outcome = service
        .create_bulk(
            &context,
            request.street,
            request.start,
            request.end,
            request.reference,
            request.community_id,
        )
        .await?;
    Ok(creation_response(outcome, |residences, warning| {
        ApiResponse::created(BulkCreateResponse::new(residences, warning)).into_response()
    }))
}

/// Residences the caller is associated with
#[utoipa::path(
    get,
    path = RESIDENCE_MINE_PATH,
    responses(
        (status = OK, description = "The caller's residences", body = ApiResponse<Vec<Residence>>),
    )
)]
#[instrument(skip_all, err(Debug))]
pub async fn my_residences<E: ColoniaEngine>(
    State(service): State<ResidenceService<E>>,
    Extension(context): Extension<SessionContext>,
) -> Result<Response, EndpointError> {
    Ok(ApiResponse::ok(service.mine(&context).await?).into_response())
}

#[utoipa::path(
    get,
    path = RESIDENCE_GET_PATH,
    responses(
        (status = OK, description = "The residence was found", body = ApiResponse<Residence>),
        (status = NOT_FOUND, description = "No residence has the given id", body = ApiError),
    ),
    params(
        ("residence_id" = String, Path, description = "The residence to find"),
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn get_residence<E: ColoniaEngine>(
    State(service): State<ResidenceService<E>>,
    ApiPath(residence_id): ApiPath<ResidenceId>,
) -> Result<Response, EndpointError> {
    Ok(service
        .get(residence_id)
        .await?
        .map(|r| ApiResponse::ok(r).into_response())
        .unwrap_or_else(|| ApiError::not_found("residence").into_response()))
}

/// Ask to be associated with a residence of the caller's community
#[utoipa::path(
    post,
    path = RESIDENCE_CLAIM_PATH,
    responses(
        (status = CREATED, description = "The claim was recorded, the message says whether it still needs verifying", body = ApiResponse<ClaimResponse>),
        (status = NOT_FOUND, description = "The residence or the caller's profile does not exist", body = ApiError),
        (status = FORBIDDEN, description = "The residence belongs to another community", body = ApiError),
        (status = CONFLICT, description = "The caller is already associated, or has not joined a community", body = ApiError),
    ),
    params(
        ("residence_id" = String, Path, description = "The residence to claim"),
    )
)]
#[instrument(skip(service, context), err(Debug))]
pub async fn claim_residence<E: ColoniaEngine>(
    State(service): State<ResidenceService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath(residence_id): ApiPath<ResidenceId>,
) -> Result<Response, EndpointError> {
    let res = match service.claim(&context, residence_id).await? {
        ClaimOutcome::Claimed { association, kind } => {
            ApiResponse::created(ClaimResponse::new(association, kind)).into_response()
        }
        ClaimOutcome::ResidenceNotFound => ApiError::not_found("residence").into_response(),
        ClaimOutcome::ProfileNotFound => ApiError::not_found("profile").into_response(),
        ClaimOutcome::NoCommunity => {
            ApiError::conflict("join a community before claiming a residence").into_response()
        }
        ClaimOutcome::OtherCommunity => {
            ApiError::forbidden("the residence belongs to another community").into_response()
        }
        ClaimOutcome::AlreadyAssociated => {
            ApiError::conflict("already associated with this residence").into_response()
        }
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = RESIDENCE_ASSOCIATIONS_PATH,
    responses(
        (status = OK, description = "Everyone associated with the residence", body = ApiResponse<Vec<Association>>),
        (status = NOT_FOUND, description = "No residence has the given id", body = ApiError),
    ),
    params(
        ("residence_id" = String, Path, description = "The residence whose associations to list"),
    )
)]
#[instrument(skip(service), err(Debug))]
pub async fn residence_associations<E: ColoniaEngine>(
    State(service): State<ResidenceService<E>>,
    ApiPath(residence_id): ApiPath<ResidenceId>,
) -> Result<Response, EndpointError> {
    Ok(service
        .associations(residence_id)
        .await?
        .map(|a| ApiResponse::ok(a).into_response())
        .unwrap_or_else(|| ApiError::not_found("residence").into_response()))
}

/// Approve a pending claim. Approving an already verified association changes nothing.
#[utoipa::path(
    patch,
    path = RESIDENCE_VERIFY_PATH,
    responses(
        (status = OK, description = "The association is verified", body = ApiResponse<Association>),
        (status = FORBIDDEN, description = "The caller does not administer the residence's community", body = ApiError),
        (status = NOT_FOUND, description = "The residence or the association does not exist", body = ApiError),
    ),
    params(
        ("residence_id" = String, Path, description = "The claimed residence"),
        ("profile_id" = String, Path, description = "The profile whose claim to verify"),
    )
)]
#[instrument(skip(service, context), err(Debug))]
pub async fn verify_association<E: ColoniaEngine>(
    State(service): State<ResidenceService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath((residence_id, profile_id)): ApiPath<(ResidenceId, ProfileId)>,
) -> Result<Response, EndpointError> {
    let res = match service.verify(&context, residence_id, profile_id).await? {
        VerifyOutcome::Verified(association) => ApiResponse::ok(association).into_response(),
        VerifyOutcome::ResidenceNotFound => ApiError::not_found("residence").into_response(),
        VerifyOutcome::AssociationNotFound => ApiError::not_found("association").into_response(),
        VerifyOutcome::NotAdministrator => {
            ApiError::forbidden("only an administrator of the community can verify residents")
                .into_response()
        }
    };
    Ok(res)
}

/// Visits registered for a residence the caller is associated with, latest scheduled first
#[utoipa::path(
    get,
    path = RESIDENCE_VISITS_PATH,
    responses(
        (status = OK, description = "The residence's visits", body = ApiResponse<Vec<Visit>>),
        (status = FORBIDDEN, description = "The caller is not associated with the residence", body = ApiError),
        (status = NOT_FOUND, description = "No residence has the given id", body = ApiError),
    ),
    params(
        ("residence_id" = String, Path, description = "The residence whose visits to list"),
    )
)]
#[instrument(skip(service, context), err(Debug))]
pub async fn residence_visits<E: ColoniaEngine>(
    State(service): State<VisitService<E>>,
    Extension(context): Extension<SessionContext>,
    ApiPath(residence_id): ApiPath<ResidenceId>,
) -> Result<Response, EndpointError> {
    let res = match service.for_residence(&context, residence_id).await? {
        ResidenceVisitsOutcome::Visits(visits) => ApiResponse::ok(visits).into_response(),
        ResidenceVisitsOutcome::ResidenceNotFound => {
            ApiError::not_found("residence").into_response()
        }
        ResidenceVisitsOutcome::NotAssociated => {
            ApiError::forbidden("not associated with this residence").into_response()
        }
    };
    Ok(res)
}
