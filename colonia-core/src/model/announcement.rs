use crate::ids::{AnnouncementId, CommunityId, ProfileId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub body: String,
    pub author_id: ProfileId,
    pub community_id: CommunityId,
    pub important: bool,
    pub published_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn create(id: AnnouncementId, new_announcement: NewAnnouncement) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: new_announcement.title,
            body: new_announcement.body,
            author_id: new_announcement.author_id,
            community_id: new_announcement.community_id,
            important: new_announcement.important,
            published_at: now,
            expires_at: new_announcement.expires_at,
            created: now,
            updated: None,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    /// Important announcements first, then newest first
    pub fn display_order(a: &Announcement, b: &Announcement) -> Ordering {
        b.important
            .cmp(&a.important)
            .then_with(|| b.published_at.cmp(&a.published_at))
    }
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub body: String,
    pub author_id: ProfileId,
    pub community_id: CommunityId,
    pub important: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Fields to change on an existing announcement, `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct AnnouncementChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub important: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AnnouncementChanges {
    pub fn apply(self, announcement: &mut Announcement) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(body) = self.body {
            announcement.body = body;
        }
        if let Some(important) = self.important {
            announcement.important = important;
        }
        if let Some(expires_at) = self.expires_at {
            announcement.expires_at = Some(expires_at);
        }
        announcement.updated = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(title: &str, important: bool, age_minutes: i64) -> Announcement {
        let mut announcement = Announcement::create(
            AnnouncementId::new(),
            NewAnnouncement {
                title: title.to_string(),
                body: String::new(),
                author_id: ProfileId::new(),
                community_id: CommunityId::new(),
                important,
                expires_at: None,
            },
        );
        announcement.published_at = Utc::now() - Duration::minutes(age_minutes);
        announcement
    }

    #[test]
    fn expired_announcements_are_inactive() {
        let now = Utc::now();
        let mut announcement = announcement("corte de agua", false, 0);
        assert!(announcement.is_active(now));

        announcement.expires_at = Some(now + Duration::hours(1));
        assert!(announcement.is_active(now));

        announcement.expires_at = Some(now - Duration::hours(1));
        assert!(!announcement.is_active(now));
    }

    #[test]
    fn important_first_then_newest() {
        let mut announcements = vec![
            announcement("old", false, 30),
            announcement("old important", true, 60),
            announcement("new", false, 1),
            announcement("new important", true, 5),
        ];

        announcements.sort_by(Announcement::display_order);

        let titles: Vec<_> = announcements.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(vec!["new important", "old important", "new", "old"], titles);
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let mut announcement = announcement("junta", false, 0);
        let expires_at = Utc::now() + Duration::days(1);

        AnnouncementChanges {
            body: Some("Se cambia al salon".to_string()),
            expires_at: Some(expires_at),
            ..Default::default()
        }
        .apply(&mut announcement);

        assert_eq!("junta", announcement.title);
        assert_eq!("Se cambia al salon", announcement.body);
        assert!(!announcement.important);
        assert_eq!(Some(expires_at), announcement.expires_at);
        assert!(announcement.updated.is_some());
    }
}
