pub mod announcements;
pub mod auth;
pub mod metrics;
pub mod teachers;
