mod announcement;
mod association;
mod community;
mod profile;
mod residence;
mod visit;

pub use announcement::{Announcement, AnnouncementChanges, NewAnnouncement};
pub use association::{Association, AssociationRole, AssociationState, NewAssociation};
pub use community::{Community, NewCommunity};
pub use profile::{NewProfile, Profile, Role};
pub use residence::{NewResidence, Residence};
pub use visit::{NewVisit, Visit, VisitRequest, VisitType, VisitValidationError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("'{0}' is not a known value")]
pub struct UnknownVariant(pub String);
