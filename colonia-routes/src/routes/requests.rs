use chrono::{DateTime, Utc};
use colonia_core::ids::CommunityId;
use colonia_core::model::{AnnouncementChanges, VisitRequest, VisitType};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommunityRequest {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateResidenceRequest {
    pub number: String,
    pub street: String,
    /// Free text that helps locating the residence, e.g. "green gate"
    pub reference: Option<String>,
    pub community_id: CommunityId,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCreateResidencesRequest {
    pub street: String,
    /// First house number, inclusive
    pub start: u32,
    /// Last house number, inclusive
    pub end: u32,
    pub reference: Option<String>,
    pub community_id: CommunityId,
}

/// Blank or missing visitor fields are reported back as validation errors
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterVisitRequest {
    #[serde(default)]
    pub visitor_name: String,
    #[serde(default)]
    pub visitor_surname: String,
    #[serde(default)]
    pub visitor_doc_id: String,
    #[serde(default)]
    pub visit_type: VisitType,
    /// Defaults to now. May be in the past.
    #[serde(default = "Utc::now")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub residence_id: String,
    #[serde(default)]
    pub activate_immediately: bool,
}

impl From<RegisterVisitRequest> for VisitRequest {
    fn from(value: RegisterVisitRequest) -> Self {
        Self {
            visitor_name: value.visitor_name,
            visitor_surname: value.visitor_surname,
            visitor_doc_id: value.visitor_doc_id,
            visit_type: value.visit_type,
            scheduled_at: value.scheduled_at,
            residence_id: value.residence_id,
            activate_immediately: value.activate_immediately,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetVisitActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub important: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Only the fields present are changed
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAnnouncementRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub important: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<UpdateAnnouncementRequest> for AnnouncementChanges {
    fn from(value: UpdateAnnouncementRequest) -> Self {
        Self {
            title: value.title,
            body: value.body,
            important: value.important,
            expires_at: value.expires_at,
        }
    }
}
