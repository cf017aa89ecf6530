use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::error;

use crate::{
    middleware::teacher::TeacherAuth,
    models::announcement::{Announcement, CreateAnnouncementRequest, UpdateAnnouncementRequest},
    services::{
        announcements::{AnnouncementError, AnnouncementService},
        metrics,
    },
    AppState,
};

impl IntoResponse for AnnouncementError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidDateFormat
            | Self::InvalidDateRange
            | Self::InvalidId
            | Self::NoFieldsProvided => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidMessage => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(e) => {
                error!("announcement store failure: {e:#}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response();
            }
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

fn observe<T>(
    operation: &'static str,
    result: Result<T, AnnouncementError>,
) -> Result<T, AnnouncementError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::record(operation, outcome);
    result
}

/// GET /announcements/active — public, announcements whose window contains now.
pub async fn list_active(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, AnnouncementError> {
    let rows = observe(
        "active",
        AnnouncementService::active(state.announcements.as_ref(), Utc::now()).await,
    )?;
    Ok(Json(rows))
}

/// GET /announcements/all?username=
pub async fn list_all(
    State(state): State<AppState>,
    TeacherAuth(teacher): TeacherAuth,
) -> Result<Json<Vec<Announcement>>, AnnouncementError> {
    let rows = observe(
        "all",
        AnnouncementService::all(state.announcements.as_ref(), &teacher).await,
    )?;
    Ok(Json(rows))
}

/// POST /announcements/?username=
pub async fn create_announcement(
    State(state): State<AppState>,
    TeacherAuth(teacher): TeacherAuth,
    Json(body): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), AnnouncementError> {
    let created = observe(
        "create",
        AnnouncementService::create(state.announcements.as_ref(), &teacher, &body).await,
    )?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /announcements/{id}?username=
pub async fn update_announcement(
    State(state): State<AppState>,
    TeacherAuth(teacher): TeacherAuth,
    Path(id): Path<String>,
    Json(body): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Announcement>, AnnouncementError> {
    let updated = observe(
        "update",
        AnnouncementService::update(state.announcements.as_ref(), &teacher, &id, &body).await,
    )?;
    Ok(Json(updated))
}

/// DELETE /announcements/{id}?username=
pub async fn delete_announcement(
    State(state): State<AppState>,
    TeacherAuth(teacher): TeacherAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>, AnnouncementError> {
    observe(
        "delete",
        AnnouncementService::delete(state.announcements.as_ref(), &teacher, &id).await,
    )?;
    Ok(Json(json!({ "message": "Announcement deleted successfully" })))
}
