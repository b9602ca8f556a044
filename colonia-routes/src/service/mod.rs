mod announcements;
mod communities;
mod identity;
mod residences;
mod visits;

pub use announcements::{
    ActiveAnnouncementsOutcome, AnnouncementService, ChangeAnnouncementOutcome,
    CreateAnnouncementOutcome, GetAnnouncementOutcome,
};
pub use communities::{CommunityService, CreateCommunityOutcome, JoinOutcome};
pub use identity::{IdentityService, ProfileView};
pub use residences::{
    ClaimOutcome, CreateResidencesOutcome, ResidenceService, VerifyOutcome,
};
pub use visits::{RegisterVisitOutcome, ResidenceVisitsOutcome, ToggleVisitOutcome, VisitService};
