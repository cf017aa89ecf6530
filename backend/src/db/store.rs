use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    announcement::{Announcement, AnnouncementId, AnnouncementPatch, NewAnnouncement},
    teacher::Teacher,
};

/// Returned (inside `anyhow::Error`) when the store's own date-order check
/// rejects a write.
#[derive(Debug, thiserror::Error)]
#[error("start date must be before expiration date")]
pub struct DateRangeConflict;

/// Persistence port for announcement records.
///
/// Every method is a single store round-trip; atomicity beyond that is not
/// offered. Implementations report infrastructure failures through
/// `anyhow::Error` and absence through `Option`/`bool`.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    /// Records with `expiration_date >= now` and no start date or `start_date <= now`.
    async fn list_active(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Announcement>>;

    async fn list_all(&self) -> anyhow::Result<Vec<Announcement>>;

    async fn find(&self, id: AnnouncementId) -> anyhow::Result<Option<Announcement>>;

    async fn insert(&self, new: &NewAnnouncement) -> anyhow::Result<Announcement>;

    /// Writes only the fields present in `patch`. `None` when `id` is gone,
    /// `DateRangeConflict` when the stored row would end up out of order.
    async fn update(
        &self,
        id: AnnouncementId,
        patch: &AnnouncementPatch,
    ) -> anyhow::Result<Option<Announcement>>;

    /// `true` when a record was actually removed.
    async fn delete(&self, id: AnnouncementId) -> anyhow::Result<bool>;

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Lookup port used for the existence-based teacher check.
#[async_trait]
pub trait TeacherDirectory: Send + Sync {
    async fn find_teacher(&self, username: &str) -> anyhow::Result<Option<Teacher>>;
}
