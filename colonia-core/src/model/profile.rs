use crate::ids::{CommunityId, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

/// Role held by a profile, stored as a numeric code.
/// Codes outside the known set are kept as-is and never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Administrator,
    Guard,
    Resident,
    Unknown(i16),
}

impl Role {
    pub const ADMINISTRATOR_CODE: i16 = 1;
    pub const GUARD_CODE: i16 = 2;
    pub const RESIDENT_CODE: i16 = 3;

    pub fn from_code(code: i16) -> Self {
        match code {
            Self::ADMINISTRATOR_CODE => Role::Administrator,
            Self::GUARD_CODE => Role::Guard,
            Self::RESIDENT_CODE => Role::Resident,
            other => Role::Unknown(other),
        }
    }

    pub fn code(&self) -> i16 {
        match self {
            Role::Administrator => Self::ADMINISTRATOR_CODE,
            Role::Guard => Self::GUARD_CODE,
            Role::Resident => Self::RESIDENT_CODE,
            Role::Unknown(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Guard => "Guard",
            Role::Resident => "Resident",
            Role::Unknown(_) => "User",
        }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role_code: i16,
    pub community_id: Option<CommunityId>,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn create(new_profile: NewProfile) -> Self {
        Self {
            id: new_profile.id,
            email: new_profile.email,
            first_name: new_profile.first_name,
            last_name: new_profile.last_name,
            phone: new_profile.phone,
            role_code: new_profile.role_code,
            community_id: None,
            active: true,
            created: Utc::now(),
            updated: None,
        }
    }

    pub fn role(&self) -> Role {
        Role::from_code(self.role_code)
    }

    pub fn is_administrator(&self) -> bool {
        self.role().is_administrator()
    }

    /// Administrator whose own community is `community_id`
    pub fn administers(&self, community_id: CommunityId) -> bool {
        self.is_administrator() && self.community_id == Some(community_id)
    }

    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.split('@').next().unwrap_or_default().to_string()
        } else {
            name.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: ProfileId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role_code: i16,
}

impl NewProfile {
    /// Every sign-up starts out as a resident
    pub fn resident(id: ProfileId, email: String, first_name: String, last_name: String) -> Self {
        Self {
            id,
            email,
            first_name,
            last_name,
            phone: None,
            role_code: Role::RESIDENT_CODE,
        }
    }

    /// Profile for an identity that signed in without one, named after its email
    pub fn from_email(id: ProfileId, email: String) -> Self {
        let first_name = email.split('@').next().unwrap_or_default().to_string();
        Self::resident(id, email, first_name, String::new())
    }

    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }
}
