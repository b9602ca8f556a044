use crate::claim::ClaimTerms;
use crate::ids::{AssociationId, ProfileId, ResidenceId};
use crate::model::UnknownVariant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssociationRole {
    Owner,
    FamilyMember,
    Administrator,
}

impl AssociationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationRole::Owner => "owner",
            AssociationRole::FamilyMember => "family_member",
            AssociationRole::Administrator => "administrator",
        }
    }
}

impl Display for AssociationRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssociationRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(AssociationRole::Owner),
            "family_member" => Ok(AssociationRole::FamilyMember),
            "administrator" => Ok(AssociationRole::Administrator),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// An association starts out pending unless it was created verified;
/// an administrator of the community moves it to verified.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssociationState {
    Pending,
    Verified,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Association {
    pub id: AssociationId,
    pub profile_id: ProfileId,
    pub residence_id: ResidenceId,
    pub role: AssociationRole,
    pub principal: bool,
    pub verified: bool,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Association {
    pub fn create(id: AssociationId, new_association: NewAssociation) -> Self {
        Self {
            id,
            profile_id: new_association.profile_id,
            residence_id: new_association.residence_id,
            role: new_association.terms.role,
            principal: new_association.terms.principal,
            verified: new_association.terms.verified,
            created: Utc::now(),
            updated: None,
        }
    }

    pub fn state(&self) -> AssociationState {
        if self.verified {
            AssociationState::Verified
        } else {
            AssociationState::Pending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAssociation {
    pub profile_id: ProfileId,
    pub residence_id: ResidenceId,
    pub terms: ClaimTerms,
}

impl NewAssociation {
    pub fn new(profile_id: ProfileId, residence_id: ResidenceId, terms: ClaimTerms) -> Self {
        Self {
            profile_id,
            residence_id,
            terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_text_round_trips() {
        for role in [
            AssociationRole::Owner,
            AssociationRole::FamilyMember,
            AssociationRole::Administrator,
        ] {
            assert_eq!(Ok(role), role.as_str().parse());
        }
    }

    #[test]
    fn unknown_role_text_is_rejected() {
        assert_eq!(
            Err(UnknownVariant("inquilino".to_string())),
            "inquilino".parse::<AssociationRole>()
        );
    }

    #[test]
    fn state_follows_verified_flag() {
        let mut association = Association::create(
            AssociationId::new(),
            NewAssociation::new(
                ProfileId::new(),
                ResidenceId::new(),
                ClaimTerms::administrator(),
            ),
        );
        assert_eq!(AssociationState::Verified, association.state());

        association.verified = false;
        assert_eq!(AssociationState::Pending, association.state());
    }
}
