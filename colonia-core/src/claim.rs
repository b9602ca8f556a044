use crate::model::AssociationRole;

/// How a residence claim is recorded, decided from who is claiming
/// and whether the residence already has someone associated with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    Administrator,
    FamilyMember,
    Owner,
}

impl ClaimKind {
    pub fn decide(claimant_is_admin: bool, has_existing_associations: bool) -> Self {
        if claimant_is_admin {
            ClaimKind::Administrator
        } else if has_existing_associations {
            ClaimKind::FamilyMember
        } else {
            ClaimKind::Owner
        }
    }

    pub fn terms(&self) -> ClaimTerms {
        match self {
            ClaimKind::Administrator => ClaimTerms {
                role: AssociationRole::Owner,
                principal: true,
                verified: true,
            },
            ClaimKind::FamilyMember => ClaimTerms {
                role: AssociationRole::FamilyMember,
                principal: false,
                verified: false,
            },
            ClaimKind::Owner => ClaimTerms {
                role: AssociationRole::Owner,
                principal: false,
                verified: false,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimKind::Administrator => "administrator",
            ClaimKind::FamilyMember => "family_member",
            ClaimKind::Owner => "owner",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ClaimKind::Administrator => "Residence registered and verified automatically",
            ClaimKind::FamilyMember => {
                "Request sent, pending review by an administrator as a family member"
            }
            ClaimKind::Owner => "Request sent, pending verification by an administrator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimTerms {
    pub role: AssociationRole,
    pub principal: bool,
    pub verified: bool,
}

impl ClaimTerms {
    /// Terms for the association an administrator gets on residences they create
    pub fn administrator() -> Self {
        Self {
            role: AssociationRole::Administrator,
            principal: true,
            verified: true,
        }
    }
}
