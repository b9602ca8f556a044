use crate::postgres::statements::{
    CREATE_ANNOUNCEMENT, DELETE_ANNOUNCEMENT, GET_ANNOUNCEMENT, LIST_ACTIVE_ANNOUNCEMENTS,
    UPDATE_ANNOUNCEMENT,
};
use crate::postgres::{client, write_failed};
use chrono::{DateTime, Utc};
use colonia_core::ids::{AnnouncementId, CommunityId, ProfileId};
use colonia_core::model::{Announcement, AnnouncementChanges, NewAnnouncement};
use colonia_core::repository::AnnouncementRepository;
use colonia_core::result::{Entity, OptRepoResult, Reason, RepoError, RepoResult};
use deadpool_postgres::Pool;
use error_stack::ResultExt;
use std::borrow::Borrow;
use tokio_postgres::Row;
use uuid::Uuid;

#[derive(Clone)]
pub struct AnnouncementRepo {
    pool: Pool,
}

impl AnnouncementRepo {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn row_to_announcement(row: impl Borrow<Row>) -> Announcement {
    let row = row.borrow();
    Announcement {
        id: AnnouncementId::from(row.get::<_, Uuid>("id")),
        title: row.get("titulo"),
        body: row.get("contenido"),
        author_id: ProfileId::from(row.get::<_, Uuid>("usuario_id")),
        community_id: CommunityId::from(row.get::<_, Uuid>("colonia_id")),
        important: row.get("importante"),
        published_at: row.get("fecha_publicacion"),
        expires_at: row.get("fecha_expiracion"),
        created: row.get("created_at"),
        updated: row.get("updated_at"),
    }
}

impl AnnouncementRepository for AnnouncementRepo {
    async fn create(&self, new_announcement: NewAnnouncement) -> RepoResult<Announcement> {
        let on_err = RepoError::Create(Entity::Announcement, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(CREATE_ANNOUNCEMENT.query, CREATE_ANNOUNCEMENT.types)
            .await
            .change_context(on_err)?;

        client
            .query_one(
                &statement,
                &[
                    &AnnouncementId::new().into_inner(),
                    &new_announcement.title,
                    &new_announcement.body,
                    &new_announcement.author_id.into_inner(),
                    &new_announcement.community_id.into_inner(),
                    &new_announcement.important,
                    &new_announcement.expires_at,
                ],
            )
            .await
            .map(row_to_announcement)
            .map_err(|e| write_failed(e, RepoError::Create, Entity::Announcement))
    }

    async fn list_active(
        &self,
        community_id: CommunityId,
        now: DateTime<Utc>,
    ) -> RepoResult<Vec<Announcement>> {
        let client = client(&self.pool, RepoError::List(Entity::Announcement)).await?;
        let statement = client
            .prepare_typed_cached(
                LIST_ACTIVE_ANNOUNCEMENTS.query,
                LIST_ACTIVE_ANNOUNCEMENTS.types,
            )
            .await
            .change_context(RepoError::List(Entity::Announcement))?;

        let rows = client
            .query(&statement, &[&community_id.into_inner(), &now])
            .await
            .change_context(RepoError::List(Entity::Announcement))?;
        Ok(rows.into_iter().map(row_to_announcement).collect())
    }

    async fn get(&self, id: AnnouncementId) -> OptRepoResult<Announcement> {
        let client = client(&self.pool, RepoError::Get(Entity::Announcement)).await?;
        let statement = client
            .prepare_typed_cached(GET_ANNOUNCEMENT.query, GET_ANNOUNCEMENT.types)
            .await
            .change_context(RepoError::Get(Entity::Announcement))?;

        let announcement = client
            .query_opt(&statement, &[&id.into_inner()])
            .await
            .change_context(RepoError::Get(Entity::Announcement))?
            .map(row_to_announcement);
        Ok(announcement)
    }

    async fn update(
        &self,
        id: AnnouncementId,
        changes: AnnouncementChanges,
    ) -> OptRepoResult<Announcement> {
        let on_err = RepoError::Update(Entity::Announcement, Reason::Db);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(UPDATE_ANNOUNCEMENT.query, UPDATE_ANNOUNCEMENT.types)
            .await
            .change_context(on_err)?;

        client
            .query_opt(
                &statement,
                &[
                    &id.into_inner(),
                    &changes.title,
                    &changes.body,
                    &changes.important,
                    &changes.expires_at,
                ],
            )
            .await
            .map(|row| row.map(row_to_announcement))
            .map_err(|e| write_failed(e, RepoError::Update, Entity::Announcement))
    }

    async fn delete(&self, id: AnnouncementId) -> OptRepoResult<Announcement> {
        let on_err = RepoError::Delete(Entity::Announcement);
        let client = client(&self.pool, on_err).await?;
        let statement = client
            .prepare_typed_cached(DELETE_ANNOUNCEMENT.query, DELETE_ANNOUNCEMENT.types)
            .await
            .change_context(on_err)?;

        let announcement = client
            .query_opt(&statement, &[&id.into_inner()])
            .await
            .change_context(on_err)?
            .map(row_to_announcement);
        Ok(announcement)
    }
}
