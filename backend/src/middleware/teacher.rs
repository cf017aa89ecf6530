use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, Method},
};
use serde::Deserialize;

use crate::{
    models::teacher::Teacher,
    services::{announcements::AnnouncementError, auth::verify_teacher, metrics},
    AppState,
};

#[derive(Debug, Deserialize)]
struct UsernameQuery {
    username: Option<String>,
}

/// Metrics label of the teacher-only announcement route behind `method`.
fn operation_for(method: &Method) -> &'static str {
    match *method {
        Method::POST => "create",
        Method::PUT => "update",
        Method::DELETE => "delete",
        _ => "all",
    }
}

/// Extractor that resolves the `username` query parameter to a known teacher.
/// A missing parameter is rejected the same way as an unknown one.
pub struct TeacherAuth(pub Teacher);

impl FromRequestParts<AppState> for TeacherAuth {
    type Rejection = AnnouncementError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let username = Query::<UsernameQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.username)
            .unwrap_or_default();

        // Rejected requests never reach the handler, so count them here.
        let teacher = verify_teacher(state.teachers.as_ref(), &username)
            .await
            .inspect_err(|e| metrics::record(operation_for(&parts.method), e.kind()))?;
        Ok(TeacherAuth(teacher))
    }
}
