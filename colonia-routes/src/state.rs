use crate::service::{
    AnnouncementService, CommunityService, IdentityService, ResidenceService, VisitService,
};
use crate::session::{AuthProvider, SessionStore};
use axum::extract::FromRef;
use colonia_core::ColoniaEngine;

#[derive(Clone)]
pub struct AppState<E, A> {
    pub identity: IdentityService<E, A>,
    pub communities: CommunityService<E>,
    pub residences: ResidenceService<E>,
    pub visits: VisitService<E>,
    pub announcements: AnnouncementService<E>,
    pub sessions: SessionStore<A>,
    pub metrics_enabled: bool,
}

impl<E: ColoniaEngine, A: AuthProvider> AppState<E, A> {
    pub fn new_with_metrics(engine: E, sessions: SessionStore<A>) -> Self {
        Self::new(engine, sessions, true)
    }

    pub fn new_without_metrics(engine: E, sessions: SessionStore<A>) -> Self {
        Self::new(engine, sessions, false)
    }

    fn new(engine: E, sessions: SessionStore<A>, metrics_enabled: bool) -> Self {
        Self {
            identity: IdentityService::new(engine.clone(), sessions.clone()),
            communities: CommunityService::new(engine.clone()),
            residences: ResidenceService::new(engine.clone()),
            visits: VisitService::new(engine.clone()),
            announcements: AnnouncementService::new(engine),
            sessions,
            metrics_enabled,
        }
    }
}

impl<E: ColoniaEngine, A: AuthProvider> FromRef<AppState<E, A>> for IdentityService<E, A> {
    fn from_ref(input: &AppState<E, A>) -> Self {
        input.identity.clone()
    }
}

impl<E: ColoniaEngine, A: AuthProvider> FromRef<AppState<E, A>> for CommunityService<E> {
    fn from_ref(input: &AppState<E, A>) -> Self {
        input.communities.clone()
    }
}

impl<E: ColoniaEngine, A: AuthProvider> FromRef<AppState<E, A>> for ResidenceService<E> {
    fn from_ref(input: &AppState<E, A>) -> Self {
        input.residences.clone()
    }
}

impl<E: ColoniaEngine, A: AuthProvider> FromRef<AppState<E, A>> for VisitService<E> {
    fn from_ref(input: &AppState<E, A>) -> Self {
        input.visits.clone()
    }
}

impl<E: ColoniaEngine, A: AuthProvider> FromRef<AppState<E, A>> for AnnouncementService<E> {
    fn from_ref(input: &AppState<E, A>) -> Self {
        input.announcements.clone()
    }
}

impl<E: ColoniaEngine, A: AuthProvider> FromRef<AppState<E, A>> for SessionStore<A> {
    fn from_ref(input: &AppState<E, A>) -> Self {
        input.sessions.clone()
    }
}
