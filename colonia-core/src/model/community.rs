use crate::ids::{CommunityId, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub address: String,
    /// The profile that created the community
    pub admin_id: Option<ProfileId>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Community {
    pub fn create(id: CommunityId, new_community: NewCommunity, admin_id: ProfileId) -> Self {
        Self {
            id,
            name: new_community.name,
            address: new_community.address,
            admin_id: Some(admin_id),
            created: Utc::now(),
            updated: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
    pub address: String,
}

impl NewCommunity {
    pub fn new(name: String, address: String) -> Self {
        Self {
            name: name.trim().to_string(),
            address: address.trim().to_string(),
        }
    }
}
