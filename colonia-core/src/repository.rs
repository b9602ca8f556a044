use crate::ids::{AnnouncementId, CommunityId, ProfileId, ResidenceId, VisitId};
use crate::model::{
    Announcement, AnnouncementChanges, Association, Community, NewAnnouncement, NewAssociation,
    NewCommunity, NewProfile, NewResidence, NewVisit, Profile, Residence, Visit,
};
use crate::result::{OptRepoResult, RepoResult};
use chrono::{DateTime, Utc};

pub trait ProfileRepository {
    fn get(&self, id: ProfileId) -> impl Future<Output = OptRepoResult<Profile>> + Send;

    /// Fails with [`crate::result::Reason::Duplicate`] when a profile with that id exists
    fn create(&self, new_profile: NewProfile) -> impl Future<Output = RepoResult<Profile>> + Send;

    /// Points the profile at a community. `None` when the profile does not exist.
    fn join_community(
        &self,
        id: ProfileId,
        community_id: CommunityId,
    ) -> impl Future<Output = OptRepoResult<Profile>> + Send;
}

pub trait CommunityRepository {
    fn get(&self, id: CommunityId) -> impl Future<Output = OptRepoResult<Community>> + Send;

    fn list(&self) -> impl Future<Output = RepoResult<Vec<Community>>> + Send;

    /// Creates the community and promotes `admin_id` to administrator of it.
    /// Both writes land together or not at all.
    fn create_with_admin(
        &self,
        new_community: NewCommunity,
        admin_id: ProfileId,
    ) -> impl Future<Output = RepoResult<Community>> + Send;
}

pub trait ResidenceRepository {
    fn get(&self, id: ResidenceId) -> impl Future<Output = OptRepoResult<Residence>> + Send;

    /// Ids that do not exist are skipped
    fn find_many(
        &self,
        ids: Vec<ResidenceId>,
    ) -> impl Future<Output = RepoResult<Vec<Residence>>> + Send;

    fn list_by_community(
        &self,
        community_id: CommunityId,
    ) -> impl Future<Output = RepoResult<Vec<Residence>>> + Send;

    /// Creates every residence along with a verified principal administrator association
    /// for `admin_id` on each, all in one unit of work.
    fn create_with_admin(
        &self,
        residences: Vec<NewResidence>,
        admin_id: ProfileId,
    ) -> impl Future<Output = RepoResult<Vec<Residence>>> + Send;
}

pub trait AssociationRepository {
    fn count_for_residence(
        &self,
        residence_id: ResidenceId,
    ) -> impl Future<Output = RepoResult<u64>> + Send;

    fn find(
        &self,
        profile_id: ProfileId,
        residence_id: ResidenceId,
    ) -> impl Future<Output = OptRepoResult<Association>> + Send;

    /// Fails with [`crate::result::Reason::Duplicate`] when the profile is already associated
    /// with the residence.
    fn create(
        &self,
        new_association: NewAssociation,
    ) -> impl Future<Output = RepoResult<Association>> + Send;

    fn for_residence(
        &self,
        residence_id: ResidenceId,
    ) -> impl Future<Output = RepoResult<Vec<Association>>> + Send;

    fn for_profile(
        &self,
        profile_id: ProfileId,
    ) -> impl Future<Output = RepoResult<Vec<Association>>> + Send;

    /// Marks the association verified. `None` when there is no such association.
    fn verify(
        &self,
        profile_id: ProfileId,
        residence_id: ResidenceId,
    ) -> impl Future<Output = OptRepoResult<Association>> + Send;
}

pub trait VisitRepository {
    fn create(&self, new_visit: NewVisit) -> impl Future<Output = RepoResult<Visit>> + Send;

    fn get(&self, id: VisitId) -> impl Future<Output = OptRepoResult<Visit>> + Send;

    /// Most recently scheduled first
    fn list_by_residence(
        &self,
        residence_id: ResidenceId,
    ) -> impl Future<Output = RepoResult<Vec<Visit>>> + Send;

    fn set_active(
        &self,
        id: VisitId,
        active: bool,
    ) -> impl Future<Output = OptRepoResult<Visit>> + Send;
}

pub trait AnnouncementRepository {
    fn create(
        &self,
        new_announcement: NewAnnouncement,
    ) -> impl Future<Output = RepoResult<Announcement>> + Send;

    /// Announcements of the community that have not expired at `now`,
    /// in [`Announcement::display_order`].
    fn list_active(
        &self,
        community_id: CommunityId,
        now: DateTime<Utc>,
    ) -> impl Future<Output = RepoResult<Vec<Announcement>>> + Send;

    fn get(&self, id: AnnouncementId) -> impl Future<Output = OptRepoResult<Announcement>> + Send;

    fn update(
        &self,
        id: AnnouncementId,
        changes: AnnouncementChanges,
    ) -> impl Future<Output = OptRepoResult<Announcement>> + Send;

    /// The removed announcement, `None` when there was nothing to remove
    fn delete(&self, id: AnnouncementId) -> impl Future<Output = OptRepoResult<Announcement>> + Send;
}
