use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    db::store::{AnnouncementStore, DateRangeConflict},
    models::{
        announcement::{
            message_len_ok, parse_timestamp, Announcement, AnnouncementId, AnnouncementPatch,
            CreateAnnouncementRequest, NewAnnouncement, UpdateAnnouncementRequest,
        },
        teacher::Teacher,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum AnnouncementError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid date format")]
    InvalidDateFormat,
    #[error("Start date must be before expiration date")]
    InvalidDateRange,
    #[error("Invalid announcement ID")]
    InvalidId,
    #[error("Announcement not found")]
    NotFound,
    #[error("No fields to update")]
    NoFieldsProvided,
    #[error("Message must be between 1 and 500 characters")]
    InvalidMessage,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AnnouncementError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidDateFormat => "invalid_date_format",
            Self::InvalidDateRange => "invalid_date_range",
            Self::InvalidId => "invalid_id",
            Self::NotFound => "not_found",
            Self::NoFieldsProvided => "no_fields_provided",
            Self::InvalidMessage => "invalid_message",
            Self::Store(_) => "store_error",
        }
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, AnnouncementError> {
    parse_timestamp(raw).ok_or(AnnouncementError::InvalidDateFormat)
}

/// An empty start date means "no start date", as HTML date inputs send it.
fn parse_start_date(raw: &str) -> Result<Option<DateTime<Utc>>, AnnouncementError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_date(raw).map(Some)
}

fn parse_id(raw: &str) -> Result<AnnouncementId, AnnouncementError> {
    raw.parse().map_err(|_| AnnouncementError::InvalidId)
}

fn check_range(
    start: Option<DateTime<Utc>>,
    expiration: DateTime<Utc>,
) -> Result<(), AnnouncementError> {
    match start {
        Some(start) if start >= expiration => Err(AnnouncementError::InvalidDateRange),
        _ => Ok(()),
    }
}

pub struct AnnouncementService;

impl AnnouncementService {
    /// Announcements whose window contains `now`. Public, no teacher needed.
    pub async fn active(
        store: &dyn AnnouncementStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<Announcement>, AnnouncementError> {
        Ok(store.list_active(now).await?)
    }

    pub async fn all(
        store: &dyn AnnouncementStore,
        _teacher: &Teacher,
    ) -> Result<Vec<Announcement>, AnnouncementError> {
        Ok(store.list_all().await?)
    }

    pub async fn create(
        store: &dyn AnnouncementStore,
        teacher: &Teacher,
        req: &CreateAnnouncementRequest,
    ) -> Result<Announcement, AnnouncementError> {
        let expiration_date = parse_date(&req.expiration_date)?;
        let start_date = match req.start_date.as_deref() {
            Some(raw) => parse_start_date(raw)?,
            None => None,
        };
        check_range(start_date, expiration_date)?;

        if !message_len_ok(&req.message) {
            return Err(AnnouncementError::InvalidMessage);
        }

        let new = NewAnnouncement {
            message: req.message.clone(),
            start_date,
            expiration_date,
        };
        let announcement = store.insert(&new).await?;
        info!(id = %announcement.id, teacher = %teacher.username, "announcement created");
        Ok(announcement)
    }

    /// Partial update. Dates are revalidated against the stored record with
    /// the incoming fields laid over it, so moving only one bound still
    /// respects the ordering.
    pub async fn update(
        store: &dyn AnnouncementStore,
        teacher: &Teacher,
        id: &str,
        req: &UpdateAnnouncementRequest,
    ) -> Result<Announcement, AnnouncementError> {
        let id = parse_id(id)?;
        let existing = store.find(id).await?.ok_or(AnnouncementError::NotFound)?;

        let patch = AnnouncementPatch {
            message: req.message.clone(),
            start_date: req.start_date.as_deref().map(parse_start_date).transpose()?,
            expiration_date: req.expiration_date.as_deref().map(parse_date).transpose()?,
        };
        let merged = existing.overlay(&patch);
        check_range(merged.start_date, merged.expiration_date)?;

        if patch.message.as_deref().is_some_and(|m| !message_len_ok(m)) {
            return Err(AnnouncementError::InvalidMessage);
        }
        if patch.is_empty() {
            return Err(AnnouncementError::NoFieldsProvided);
        }

        // A concurrent write can still move the other bound between our read
        // and this write; the store reports that as a range conflict.
        let updated = store
            .update(id, &patch)
            .await
            .map_err(|e| {
                if e.is::<DateRangeConflict>() {
                    AnnouncementError::InvalidDateRange
                } else {
                    AnnouncementError::Store(e)
                }
            })?
            .ok_or(AnnouncementError::NotFound)?;
        info!(id = %updated.id, teacher = %teacher.username, "announcement updated");
        Ok(updated)
    }

    pub async fn delete(
        store: &dyn AnnouncementStore,
        teacher: &Teacher,
        id: &str,
    ) -> Result<(), AnnouncementError> {
        let id = parse_id(id)?;
        if !store.delete(id).await? {
            return Err(AnnouncementError::NotFound);
        }
        info!(%id, teacher = %teacher.username, "announcement deleted");
        Ok(())
    }
}
