use crate::ids::{CommunityId, ResidenceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Residence {
    pub id: ResidenceId,
    pub number: String,
    pub street: String,
    pub reference: Option<String>,
    pub community_id: CommunityId,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Residence {
    pub fn create(id: ResidenceId, new_residence: NewResidence) -> Self {
        Self {
            id,
            number: new_residence.number,
            street: new_residence.street,
            reference: new_residence.reference,
            community_id: new_residence.community_id,
            created: Utc::now(),
            updated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResidence {
    pub number: String,
    pub street: String,
    pub reference: Option<String>,
    pub community_id: CommunityId,
}

impl NewResidence {
    pub fn new(
        number: String,
        street: String,
        reference: Option<String>,
        community_id: CommunityId,
    ) -> Self {
        Self {
            number: number.trim().to_string(),
            street: street.trim().to_string(),
            reference: reference
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            community_id,
        }
    }
}
