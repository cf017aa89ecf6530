use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    db::store::{AnnouncementStore, DateRangeConflict, TeacherDirectory},
    models::{
        announcement::{Announcement, AnnouncementId, AnnouncementPatch, NewAnnouncement},
        teacher::Teacher,
    },
};

const COLUMNS: &str = "id, message, start_date, expiration_date";

/// SQLSTATE `check_violation`.
const CHECK_VIOLATION: &str = "23514";

fn is_check_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == CHECK_VIOLATION)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnnouncementStore for PgStore {
    async fn list_active(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {COLUMNS} FROM announcements
             WHERE expiration_date >= $1
               AND (start_date IS NULL OR start_date <= $1)
             ORDER BY expiration_date"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {COLUMNS} FROM announcements ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: AnnouncementId) -> anyhow::Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {COLUMNS} FROM announcements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, new: &NewAnnouncement) -> anyhow::Result<Announcement> {
        let row = sqlx::query_as::<_, Announcement>(&format!(
            "INSERT INTO announcements (id, message, start_date, expiration_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(AnnouncementId::new())
        .bind(&new.message)
        .bind(new.start_date)
        .bind(new.expiration_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: AnnouncementId,
        patch: &AnnouncementPatch,
    ) -> anyhow::Result<Option<Announcement>> {
        // $2 says whether start_date is part of the patch at all, so that a
        // NULL $3 can clear it.
        let row = sqlx::query_as::<_, Announcement>(&format!(
            "UPDATE announcements
             SET message = COALESCE($1, message),
                 start_date = CASE WHEN $2 THEN $3 ELSE start_date END,
                 expiration_date = COALESCE($4, expiration_date),
                 updated_at = NOW()
             WHERE id = $5
             RETURNING {COLUMNS}"
        ))
        .bind(&patch.message)
        .bind(patch.start_date.is_some())
        .bind(patch.start_date.flatten())
        .bind(patch.expiration_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_check_violation(&e) {
                anyhow::Error::new(DateRangeConflict)
            } else {
                anyhow::Error::new(e)
            }
        })?;
        Ok(row)
    }

    async fn delete(&self, id: AnnouncementId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TeacherDirectory for PgStore {
    async fn find_teacher(&self, username: &str) -> anyhow::Result<Option<Teacher>> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT username, display_name, created_at FROM teachers WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(teacher)
    }
}
