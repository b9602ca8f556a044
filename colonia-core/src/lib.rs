use repository::{
    AnnouncementRepository, AssociationRepository, CommunityRepository, ProfileRepository,
    ResidenceRepository, VisitRepository,
};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod claim;
pub mod ids;
pub mod model;
pub mod range;
pub mod repository;
pub mod result;

/// Hands out the repositories backing the services. Implementations are cheap to clone,
/// every accessor is expected to return a handle sharing the same underlying storage.
pub trait ColoniaEngine: Clone + Send + Sync + 'static {
    type Profiles: ProfileRepository + Send + Sync + 'static;
    type Communities: CommunityRepository + Send + Sync + 'static;
    type Residences: ResidenceRepository + Send + Sync + 'static;
    type Associations: AssociationRepository + Send + Sync + 'static;
    type Visits: VisitRepository + Send + Sync + 'static;
    type Announcements: AnnouncementRepository + Send + Sync + 'static;

    fn profiles(&self) -> Self::Profiles;
    fn communities(&self) -> Self::Communities;
    fn residences(&self) -> Self::Residences;
    fn associations(&self) -> Self::Associations;
    fn visits(&self) -> Self::Visits;
    fn announcements(&self) -> Self::Announcements;
}

#[derive(Debug, Default)]
pub struct ArwLock<T>(Arc<RwLock<T>>);

impl<T> ArwLock<T> {
    pub fn new(data: T) -> Self {
        Self(Arc::new(RwLock::new(data)))
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().await
    }
}

// derive(Clone) would require T: Clone
impl<T> Clone for ArwLock<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// `true` when the string has at least one non-whitespace character
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}
