use crate::error::ServiceError;
use crate::session::SessionContext;
use crate::{OptServiceResult, ServiceResult};
use chrono::{DateTime, Utc};
use colonia_core::ids::AnnouncementId;
use colonia_core::model::{Announcement, AnnouncementChanges, NewAnnouncement, Profile};
use colonia_core::repository::{AnnouncementRepository, ProfileRepository};
use colonia_core::{ColoniaEngine, is_present};
use error_stack::ResultExt;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub enum CreateAnnouncementOutcome {
    Created(Announcement),
    Invalid(&'static str),
    ProfileNotFound,
    NotAdministrator,
}

#[derive(Debug)]
pub enum ActiveAnnouncementsOutcome {
    Announcements(Vec<Announcement>),
    NoCommunity,
    ProfileNotFound,
}

#[derive(Debug)]
pub enum GetAnnouncementOutcome {
    Found(Announcement),
    NotFound,
    ProfileNotFound,
    OtherCommunity,
}

/// Result of editing or removing an announcement, `T` is what the change hands back
#[derive(Debug)]
pub enum ChangeAnnouncementOutcome<T> {
    Changed(T),
    Invalid(&'static str),
    NotFound,
    ProfileNotFound,
    NotAdministrator,
}

#[derive(Debug, Clone)]
pub struct AnnouncementService<E> {
    engine: E,
}

impl<E: ColoniaEngine> AnnouncementService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    async fn profile(&self, context: &SessionContext) -> OptServiceResult<Profile> {
        self.engine
            .profiles()
            .get(context.profile_id)
            .await
            .change_context(ServiceError)
    }

    /// Publishes to the caller's own community, which the caller must administer
    #[instrument(skip_all, name = "service#create_announcement", fields(profile_id = %context.profile_id))]
    pub async fn create(
        &self,
        context: &SessionContext,
        title: String,
        body: String,
        important: bool,
        expires_at: Option<DateTime<Utc>>,
    ) -> ServiceResult<CreateAnnouncementOutcome> {
        if !is_present(&title) {
            return Ok(CreateAnnouncementOutcome::Invalid("title is required"));
        }
        if !is_present(&body) {
            return Ok(CreateAnnouncementOutcome::Invalid("body is required"));
        }

        let Some(profile) = self.profile(context).await? else {
            return Ok(CreateAnnouncementOutcome::ProfileNotFound);
        };

        let community_id = match profile.community_id {
            Some(community_id) if profile.administers(community_id) => community_id,
            _ => return Ok(CreateAnnouncementOutcome::NotAdministrator),
        };

        let announcement = self
            .engine
            .announcements()
            .create(NewAnnouncement {
                title: title.trim().to_string(),
                body: body.trim().to_string(),
                author_id: profile.id,
                community_id,
                important,
                expires_at,
            })
            .await
            .change_context(ServiceError)?;

        info!("announcement {} published", announcement.id);
        Ok(CreateAnnouncementOutcome::Created(announcement))
    }

    /// Unexpired announcements of the caller's community, important ones first
    #[instrument(skip_all, name = "service#active_announcements", fields(profile_id = %context.profile_id))]
    pub async fn active(&self, context: &SessionContext) -> ServiceResult<ActiveAnnouncementsOutcome> {
        let Some(profile) = self.profile(context).await? else {
            return Ok(ActiveAnnouncementsOutcome::ProfileNotFound);
        };

        let Some(community_id) = profile.community_id else {
            return Ok(ActiveAnnouncementsOutcome::NoCommunity);
        };

        self.engine
            .announcements()
            .list_active(community_id, Utc::now())
            .await
            .change_context(ServiceError)
            .map(ActiveAnnouncementsOutcome::Announcements)
    }

    /// An announcement readable by anyone in its community
    #[instrument(skip_all, name = "service#get_announcement", fields(profile_id = %context.profile_id, %announcement_id))]
    pub async fn get(
        &self,
        context: &SessionContext,
        announcement_id: AnnouncementId,
    ) -> ServiceResult<GetAnnouncementOutcome> {
        let Some(announcement) = self.announcement(announcement_id).await? else {
            return Ok(GetAnnouncementOutcome::NotFound);
        };
        let Some(profile) = self.profile(context).await? else {
            return Ok(GetAnnouncementOutcome::ProfileNotFound);
        };

        if profile.community_id != Some(announcement.community_id) {
            debug!("announcement belongs to another community");
            return Ok(GetAnnouncementOutcome::OtherCommunity);
        }
        Ok(GetAnnouncementOutcome::Found(announcement))
    }

    #[instrument(skip_all, name = "service#update_announcement", fields(profile_id = %context.profile_id, %announcement_id))]
    pub async fn update(
        &self,
        context: &SessionContext,
        announcement_id: AnnouncementId,
        mut changes: AnnouncementChanges,
    ) -> ServiceResult<ChangeAnnouncementOutcome<Announcement>> {
        match changes.title.as_deref() {
            Some(title) if !is_present(title) => {
                return Ok(ChangeAnnouncementOutcome::Invalid("title is required"));
            }
            _ => {}
        }
        match changes.body.as_deref() {
            Some(body) if !is_present(body) => {
                return Ok(ChangeAnnouncementOutcome::Invalid("body is required"));
            }
            _ => {}
        }
        changes.title = changes.title.map(|title| title.trim().to_string());
        changes.body = changes.body.map(|body| body.trim().to_string());

        if let Some(refused) = self.check_administrator(context, announcement_id).await? {
            return Ok(refused);
        }

        let updated = self
            .engine
            .announcements()
            .update(announcement_id, changes)
            .await
            .change_context(ServiceError)?;

        Ok(match updated {
            Some(announcement) => {
                info!("announcement updated");
                ChangeAnnouncementOutcome::Changed(announcement)
            }
            None => ChangeAnnouncementOutcome::NotFound,
        })
    }

    #[instrument(skip_all, name = "service#delete_announcement", fields(profile_id = %context.profile_id, %announcement_id))]
    pub async fn delete(
        &self,
        context: &SessionContext,
        announcement_id: AnnouncementId,
    ) -> ServiceResult<ChangeAnnouncementOutcome<Announcement>> {
        if let Some(refused) = self.check_administrator(context, announcement_id).await? {
            return Ok(refused);
        }

        let removed = self
            .engine
            .announcements()
            .delete(announcement_id)
            .await
            .change_context(ServiceError)?;

        Ok(match removed {
            Some(announcement) => {
                info!("announcement removed");
                ChangeAnnouncementOutcome::Changed(announcement)
            }
            None => ChangeAnnouncementOutcome::NotFound,
        })
    }

    async fn announcement(&self, id: AnnouncementId) -> OptServiceResult<Announcement> {
        self.engine
            .announcements()
            .get(id)
            .await
            .change_context(ServiceError)
    }

    /// `None` when the caller administers the announcement's community
    async fn check_administrator<T>(
        &self,
        context: &SessionContext,
        announcement_id: AnnouncementId,
    ) -> ServiceResult<Option<ChangeAnnouncementOutcome<T>>> {
        let Some(announcement) = self.announcement(announcement_id).await? else {
            return Ok(Some(ChangeAnnouncementOutcome::NotFound));
        };
        let Some(profile) = self.profile(context).await? else {
            return Ok(Some(ChangeAnnouncementOutcome::ProfileNotFound));
        };

        if profile.administers(announcement.community_id) {
            Ok(None)
        } else {
            Ok(Some(ChangeAnnouncementOutcome::NotAdministrator))
        }
    }
}
