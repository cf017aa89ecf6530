// Library exports for the binaries and integration tests
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use db::store::{AnnouncementStore, TeacherDirectory};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub announcements: Arc<dyn AnnouncementStore>,
    pub teachers: Arc<dyn TeacherDirectory>,
}

impl AppState {
    /// State backed by one value serving as both announcement store and teacher directory.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AnnouncementStore + TeacherDirectory + 'static,
    {
        Self {
            announcements: store.clone(),
            teachers: store,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Announcements
        .route("/announcements/active", get(routes::announcements::list_active))
        .route("/announcements/all", get(routes::announcements::list_all))
        .route("/announcements/", post(routes::announcements::create_announcement))
        .route("/announcements", post(routes::announcements::create_announcement))
        .route(
            "/announcements/{id}",
            put(routes::announcements::update_announcement)
                .delete(routes::announcements::delete_announcement),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
