//! In-memory repositories with the same observable behaviour as the Postgres ones
//! (uniqueness, referential checks, ordering). Every repository handed out by one
//! [`MemoryEngine`] shares a single store, and multi-row writes happen under one
//! write lock so they are all-or-nothing.

use chrono::{DateTime, Utc};
use colonia_core::claim::ClaimTerms;
use colonia_core::ids::{
    AnnouncementId, AssociationId, CommunityId, ProfileId, ResidenceId, VisitId,
};
use colonia_core::model::{
    Announcement, AnnouncementChanges, Association, Community, NewAnnouncement, NewAssociation,
    NewCommunity, NewProfile, NewResidence, NewVisit, Profile, Residence, Role, Visit,
};
use colonia_core::repository::{
    AnnouncementRepository, AssociationRepository, CommunityRepository, ProfileRepository,
    ResidenceRepository, VisitRepository,
};
use colonia_core::result::{Entity, OptRepoResult, Reason, RepoError, RepoResult};
use colonia_core::{ArwLock, ColoniaEngine};
use error_stack::{IntoReport, ResultExt};
use indexmap::IndexMap;


#[derive(Debug, Default)]
struct Store {
    profiles: IndexMap<ProfileId, Profile>,
    communities: IndexMap<CommunityId, Community>,
    residences: IndexMap<ResidenceId, Residence>,
    associations: IndexMap<AssociationId, Association>,
    visits: IndexMap<VisitId, Visit>,
    announcements: IndexMap<AnnouncementId, Announcement>,
}

impl Store {
    fn association(&self, profile_id: ProfileId, residence_id: ResidenceId) -> Option<&Association> {
        self.associations
            .values()
            .find(|a| a.profile_id == profile_id && a.residence_id == residence_id)
    }

    fn insert_association(&mut self, new_association: NewAssociation) -> RepoResult<Association> {
        if !self.profiles.contains_key(&new_association.profile_id)
            || !self.residences.contains_key(&new_association.residence_id)
        {
            return Err(
                RepoError::Create(Entity::Association, Reason::MissingReference).into_report(),
            );
        }
        if self
            .association(new_association.profile_id, new_association.residence_id)
            .is_some()
        {
            return Err(RepoError::Create(Entity::Association, Reason::Duplicate).into_report())
                .attach("profile is already associated with this residence");
        }

        let association = Association::create(AssociationId::new(), new_association);
        self.associations
            .insert(association.id, association.clone());
        Ok(association)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Working,
    Failing,
}

impl Mode {
    fn check(self, on_err: RepoError) -> RepoResult<()> {
        match self {
            Mode::Working => Ok(()),
            Mode::Failing => Err(on_err.into_report()).attach("memory engine is set to fail"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    store: ArwLock<Store>,
    mode: Mode,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose every repository call fails, for exercising error paths
    pub fn failing() -> Self {
        Self {
            store: ArwLock::default(),
            mode: Mode::Failing,
        }
    }

    /// Stores a residence with nobody associated to it, the way residences loaded
    /// outside the application look. Ignores the engine mode.
    pub async fn seed_residence(&self, new_residence: NewResidence) -> Residence {
        let residence = Residence::create(ResidenceId::new(), new_residence);
        self.store
            .write()
            .await
            .residences
            .insert(residence.id, residence.clone());
        residence
    }

    fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            store: self.store.clone(),
            mode: self.mode,
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryHandle {
    store: ArwLock<Store>,
    mode: Mode,
}

#[derive(Debug, Clone)]
pub struct MemoryProfiles(MemoryHandle);
#[derive(Debug, Clone)]
pub struct MemoryCommunities(MemoryHandle);
#[derive(Debug, Clone)]
pub struct MemoryResidences(MemoryHandle);
#[derive(Debug, Clone)]
pub struct MemoryAssociations(MemoryHandle);
#[derive(Debug, Clone)]
pub struct MemoryVisits(MemoryHandle);
#[derive(Debug, Clone)]
pub struct MemoryAnnouncements(MemoryHandle);

impl ColoniaEngine for MemoryEngine {
    type Profiles = MemoryProfiles;
    type Communities = MemoryCommunities;
    type Residences = MemoryResidences;
    type Associations = MemoryAssociations;
    type Visits = MemoryVisits;
    type Announcements = MemoryAnnouncements;

    fn profiles(&self) -> Self::Profiles {
        MemoryProfiles(self.handle())
    }

    fn communities(&self) -> Self::Communities {
        MemoryCommunities(self.handle())
    }

    fn residences(&self) -> Self::Residences {
        MemoryResidences(self.handle())
    }

    fn associations(&self) -> Self::Associations {
        MemoryAssociations(self.handle())
    }

    fn visits(&self) -> Self::Visits {
        MemoryVisits(self.handle())
    }

    fn announcements(&self) -> Self::Announcements {
        MemoryAnnouncements(self.handle())
    }
}

impl ProfileRepository for MemoryProfiles {
    async fn get(&self, id: ProfileId) -> OptRepoResult<Profile> {
        self.0.mode.check(RepoError::Get(Entity::Profile))?;
        let store = self.0.store.read().await;

        Ok(store.profiles.get(&id).cloned())
    }

    async fn create(&self, new_profile: NewProfile) -> RepoResult<Profile> {
        self.0
            .mode
            .check(RepoError::Create(Entity::Profile, Reason::Db))?;
        let mut store = self.0.store.write().await;

        if store.profiles.contains_key(&new_profile.id) {
            return Err(RepoError::Create(Entity::Profile, Reason::Duplicate).into_report());
        }

        let profile = Profile::create(new_profile);
        store.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn join_community(
        &self,
        id: ProfileId,
        community_id: CommunityId,
    ) -> OptRepoResult<Profile> {
        self.0
            .mode
            .check(RepoError::Update(Entity::Profile, Reason::Db))?;
        let mut store = self.0.store.write().await;

        if !store.communities.contains_key(&community_id) {
            return Err(
                RepoError::Update(Entity::Profile, Reason::MissingReference).into_report(),
            );
        }

        Ok(store.profiles.get_mut(&id).map(|profile| {
            profile.community_id = Some(community_id);
            profile.updated = Some(Utc::now());
            profile.clone()
        }))
    }
}

impl CommunityRepository for MemoryCommunities {
    async fn get(&self, id: CommunityId) -> OptRepoResult<Community> {
        self.0.mode.check(RepoError::Get(Entity::Community))?;
        let store = self.0.store.read().await;

        Ok(store.communities.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Community>> {
        self.0.mode.check(RepoError::List(Entity::Community))?;
        let store = self.0.store.read().await;

        let mut communities: Vec<_> = store.communities.values().cloned().collect();
        communities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(communities)
    }

    async fn create_with_admin(
        &self,
        new_community: NewCommunity,
        admin_id: ProfileId,
    ) -> RepoResult<Community> {
        self.0
            .mode
            .check(RepoError::Create(Entity::Community, Reason::Db))?;
        let mut store = self.0.store.write().await;

        let id = CommunityId::new();
        let Some(admin) = store.profiles.get_mut(&admin_id) else {
            return Err(
                RepoError::Create(Entity::Community, Reason::MissingReference).into_report(),
            )
            .attach_with(|| format!("profile {admin_id} does not exist"));
        };
        admin.community_id = Some(id);
        admin.role_code = Role::ADMINISTRATOR_CODE;
        admin.updated = Some(Utc::now());

        let community = Community::create(id, new_community, admin_id);
        store.communities.insert(id, community.clone());
        Ok(community)
    }
}

fn residence_order(a: &Residence, b: &Residence) -> std::cmp::Ordering {
    a.street
        .cmp(&b.street)
        .then_with(|| a.number.len().cmp(&b.number.len()))
        .then_with(|| a.number.cmp(&b.number))
}

impl ResidenceRepository for MemoryResidences {
    async fn get(&self, id: ResidenceId) -> OptRepoResult<Residence> {
        self.0.mode.check(RepoError::Get(Entity::Residence))?;
        let store = self.0.store.read().await;

        Ok(store.residences.get(&id).cloned())
    }

    async fn find_many(&self, ids: Vec<ResidenceId>) -> RepoResult<Vec<Residence>> {
        self.0.mode.check(RepoError::List(Entity::Residence))?;
        let store = self.0.store.read().await;

        let mut residences: Vec<_> = store
            .residences
            .values()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect();
        residences.sort_by(residence_order);
        Ok(residences)
    }

    async fn list_by_community(&self, community_id: CommunityId) -> RepoResult<Vec<Residence>> {
        self.0.mode.check(RepoError::List(Entity::Residence))?;
        let store = self.0.store.read().await;

        let mut residences: Vec<_> = store
            .residences
            .values()
            .filter(|r| r.community_id == community_id)
            .cloned()
            .collect();
        residences.sort_by(residence_order);
        Ok(residences)
    }

    async fn create_with_admin(
        &self,
        residences: Vec<NewResidence>,
        admin_id: ProfileId,
    ) -> RepoResult<Vec<Residence>> {
        self.0
            .mode
            .check(RepoError::Create(Entity::Residence, Reason::Db))?;
        let mut store = self.0.store.write().await;

        let references_exist = store.profiles.contains_key(&admin_id)
            && residences
                .iter()
                .all(|r| store.communities.contains_key(&r.community_id));
        if !references_exist {
            return Err(
                RepoError::Create(Entity::Residence, Reason::MissingReference).into_report(),
            );
        }

        let mut created = Vec::with_capacity(residences.len());
        for new_residence in residences {
            let residence = Residence::create(ResidenceId::new(), new_residence);
            store.residences.insert(residence.id, residence.clone());
            store.insert_association(NewAssociation::new(
                admin_id,
                residence.id,
                ClaimTerms::administrator(),
            ))?;
            created.push(residence);
        }

        Ok(created)
    }
}

impl AssociationRepository for MemoryAssociations {
    async fn count_for_residence(&self, residence_id: ResidenceId) -> RepoResult<u64> {
        self.0.mode.check(RepoError::Count(Entity::Association))?;
        let store = self.0.store.read().await;

        Ok(store
            .associations
            .values()
            .filter(|a| a.residence_id == residence_id)
            .count() as u64)
    }

    async fn find(
        &self,
        profile_id: ProfileId,
        residence_id: ResidenceId,
    ) -> OptRepoResult<Association> {
        self.0.mode.check(RepoError::Get(Entity::Association))?;
        let store = self.0.store.read().await;

        Ok(store.association(profile_id, residence_id).cloned())
    }

    async fn create(&self, new_association: NewAssociation) -> RepoResult<Association> {
        self.0
            .mode
            .check(RepoError::Create(Entity::Association, Reason::Db))?;
        let mut store = self.0.store.write().await;

        store.insert_association(new_association)
    }

    async fn for_residence(&self, residence_id: ResidenceId) -> RepoResult<Vec<Association>> {
        self.0.mode.check(RepoError::List(Entity::Association))?;
        let store = self.0.store.read().await;

        Ok(store
            .associations
            .values()
            .filter(|a| a.residence_id == residence_id)
            .cloned()
            .collect())
    }

    async fn for_profile(&self, profile_id: ProfileId) -> RepoResult<Vec<Association>> {
        self.0.mode.check(RepoError::List(Entity::Association))?;
        let store = self.0.store.read().await;

        Ok(store
            .associations
            .values()
            .filter(|a| a.profile_id == profile_id)
            .cloned()
            .collect())
    }

    async fn verify(
        &self,
        profile_id: ProfileId,
        residence_id: ResidenceId,
    ) -> OptRepoResult<Association> {
        self.0
            .mode
            .check(RepoError::Update(Entity::Association, Reason::Db))?;
        let mut store = self.0.store.write().await;

        Ok(store
            .associations
            .values_mut()
            .find(|a| a.profile_id == profile_id && a.residence_id == residence_id)
            .map(|association| {
                if !association.verified {
                    association.verified = true;
                    association.updated = Some(Utc::now());
                }
                association.clone()
            }))
    }
}

impl VisitRepository for MemoryVisits {
    async fn create(&self, new_visit: NewVisit) -> RepoResult<Visit> {
        self.0
            .mode
            .check(RepoError::Create(Entity::Visit, Reason::Db))?;
        let mut store = self.0.store.write().await;

        if !store.residences.contains_key(&new_visit.residence_id)
            || !store.profiles.contains_key(&new_visit.created_by)
        {
            return Err(RepoError::Create(Entity::Visit, Reason::MissingReference).into_report());
        }

        let visit = Visit::create(VisitId::new(), new_visit);
        store.visits.insert(visit.id, visit.clone());
        Ok(visit)
    }

    async fn get(&self, id: VisitId) -> OptRepoResult<Visit> {
        self.0.mode.check(RepoError::Get(Entity::Visit))?;
        let store = self.0.store.read().await;

        Ok(store.visits.get(&id).cloned())
    }

    async fn list_by_residence(&self, residence_id: ResidenceId) -> RepoResult<Vec<Visit>> {
        self.0.mode.check(RepoError::List(Entity::Visit))?;
        let store = self.0.store.read().await;

        let mut visits: Vec<_> = store
            .visits
            .values()
            .filter(|v| v.residence_id == residence_id)
            .cloned()
            .collect();
        visits.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(visits)
    }

    async fn set_active(&self, id: VisitId, active: bool) -> OptRepoResult<Visit> {
        self.0
            .mode
            .check(RepoError::Update(Entity::Visit, Reason::Db))?;
        let mut store = self.0.store.write().await;

        Ok(store.visits.get_mut(&id).map(|visit| {
            visit.active = active;
            visit.updated = Some(Utc::now());
            visit.clone()
        }))
    }
}

impl AnnouncementRepository for MemoryAnnouncements {
    async fn create(&self, new_announcement: NewAnnouncement) -> RepoResult<Announcement> {
        self.0
            .mode
            .check(RepoError::Create(Entity::Announcement, Reason::Db))?;
        let mut store = self.0.store.write().await;

        if !store.profiles.contains_key(&new_announcement.author_id)
            || !store
                .communities
                .contains_key(&new_announcement.community_id)
        {
            return Err(
                RepoError::Create(Entity::Announcement, Reason::MissingReference).into_report(),
            );
        }

        let announcement = Announcement::create(AnnouncementId::new(), new_announcement);
        store
            .announcements
            .insert(announcement.id, announcement.clone());
        Ok(announcement)
    }

    async fn list_active(
        &self,
        community_id: CommunityId,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Announcement>> {
        self.0.mode.check(RepoError::List(Entity::Announcement))?;
        let store = self.0.store.read().await;

        let mut announcements: Vec<_> = store
            .announcements
            .values()
            .filter(|a| a.community_id == community_id && a.is_active(now))
            .cloned()
            .collect();
        announcements.sort_by(Announcement::display_order);
        Ok(announcements)
    }

    async fn get(&self, id: AnnouncementId) -> OptRepoResult<Announcement> {
        self.0.mode.check(RepoError::Get(Entity::Announcement))?;
        Ok(self.0.store.read().await.announcements.get(&id).cloned())
    }

    async fn update(
        &self,
        id: AnnouncementId,
        changes: AnnouncementChanges,
    ) -> OptRepoResult<Announcement> {
        self.0
            .mode
            .check(RepoError::Update(Entity::Announcement, Reason::Db))?;
        let mut store = self.0.store.write().await;

        Ok(store.announcements.get_mut(&id).map(|announcement| {
            changes.apply(announcement);
            announcement.clone()
        }))
    }

    async fn delete(&self, id: AnnouncementId) -> OptRepoResult<Announcement> {
        self.0.mode.check(RepoError::Delete(Entity::Announcement))?;
        Ok(self.0.store.write().await.announcements.shift_remove(&id))
    }
}
