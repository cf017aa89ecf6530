use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The only principal the announcement endpoints know about. Holding one is
/// proof the username was found in the teacher directory.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Teacher {
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
