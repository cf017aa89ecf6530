use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MESSAGE_MAX_CHARS: usize = 500;

/// Store-assigned identifier, rendered as a plain string at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct AnnouncementId(Uuid);

impl AnnouncementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnnouncementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnnouncementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for AnnouncementId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub message: String,
    pub start_date: Option<DateTime<Utc>>,
    pub expiration_date: DateTime<Utc>,
}

impl Announcement {
    /// Inclusive on both ends; a missing start date is always open.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date >= now && self.start_date.map_or(true, |start| start <= now)
    }

    /// Returns a copy with every field present in `patch` replaced.
    pub fn overlay(&self, patch: &AnnouncementPatch) -> Announcement {
        Announcement {
            id: self.id,
            message: patch.message.clone().unwrap_or_else(|| self.message.clone()),
            start_date: match patch.start_date {
                Some(start) => start,
                None => self.start_date,
            },
            expiration_date: patch.expiration_date.unwrap_or(self.expiration_date),
        }
    }
}

/// Body of `POST /announcements/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub message: String,
    pub start_date: Option<String>,
    pub expiration_date: String,
}

/// Body of `PUT /announcements/{id}`. `null` and a missing key mean the same
/// thing; an empty `start_date` string clears the stored start date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnnouncementRequest {
    pub message: Option<String>,
    pub start_date: Option<String>,
    pub expiration_date: Option<String>,
}

/// Validated, normalized record ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub message: String,
    pub start_date: Option<DateTime<Utc>>,
    pub expiration_date: DateTime<Utc>,
}

/// Fields to overwrite on an existing record; `None` leaves the stored value alone.
/// `start_date: Some(None)` removes the start date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementPatch {
    pub message: Option<String>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl AnnouncementPatch {
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.start_date.is_none() && self.expiration_date.is_none()
    }
}

pub fn message_len_ok(message: &str) -> bool {
    (1..=MESSAGE_MAX_CHARS).contains(&message.chars().count())
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// `YYYY-MM-DD` with a four digit, non-zero year. chrono's `%Y` also takes
/// signs and any number of digits, so the date part is checked up front.
fn has_calendar_date_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits_ok = [0, 1, 2, 3, 5, 6, 8, 9]
        .iter()
        .all(|&i| bytes[i].is_ascii_digit());
    digits_ok && &raw[..4] != "0000"
}

/// Parses an ISO-8601 date or date-time into UTC.
///
/// A trailing `Z` is read as `+00:00`, a space may stand in for the `T`
/// separator, and values without an offset are taken to be UTC already.
/// Surrounding whitespace is not accepted.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if !has_calendar_date_prefix(raw) {
        return None;
    }

    let mut normalized = raw.replacen(' ', "T", 1);
    if normalized.ends_with('Z') || normalized.ends_with('z') {
        normalized.pop();
        normalized.push_str("+00:00");
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
