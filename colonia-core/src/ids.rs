use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Clone, Copy)]
        #[serde(transparent)]
        #[schema(value_type = String)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn new_with(id: Uuid) -> Self {
                Self(id)
            }

            pub fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Uuid;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

uuid_id!(
    /// Same value as the auth provider's identity id
    ProfileId
);
uuid_id!(
    /// Shared with residents as the code used to find and join a community
    CommunityId
);
uuid_id!(
    /// Shared with residents as the code used to claim a residence
    ResidenceId
);
uuid_id!(AssociationId);
uuid_id!(VisitId);
uuid_id!(AnnouncementId);
