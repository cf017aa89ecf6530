use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use announcements_api::{app, db::memory::MemoryStore, AppState};

const TEACHER: &str = "mrodriguez";

fn test_app() -> Router {
    app(AppState::from_store(Arc::new(MemoryStore::with_teachers([TEACHER]))))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, created) = send(
        app,
        Method::POST,
        &format!("/announcements/?username={TEACHER}"),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created
}

#[tokio::test]
async fn active_is_public_and_filters_by_window() {
    let app = test_app();
    let current = create(
        &app,
        json!({ "message": "Exam tomorrow", "expiration_date": "2099-01-01T00:00:00Z" }),
    )
    .await;
    create(
        &app,
        json!({
            "message": "Already over",
            "start_date": "2000-01-01T00:00:00Z",
            "expiration_date": "2000-02-01T00:00:00Z"
        }),
    )
    .await;
    create(
        &app,
        json!({
            "message": "Not yet",
            "start_date": "2098-01-01T00:00:00Z",
            "expiration_date": "2099-01-01T00:00:00Z"
        }),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/announcements/active", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], current["id"]);
    assert!(list[0]["start_date"].is_null());
}

#[tokio::test]
async fn all_requires_a_known_teacher() {
    let app = test_app();
    create(
        &app,
        json!({
            "message": "Old news",
            "start_date": "2000-01-01",
            "expiration_date": "2000-01-02"
        }),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/announcements/all", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Unauthorized");

    let (status, _) = send(&app, Method::GET, "/announcements/all?username=ghost", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/announcements/all?username={TEACHER}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_validates_auth_then_dates() {
    let app = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/announcements/?username=ghost",
        Some(json!({ "message": "Hi", "expiration_date": "nonsense" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/announcements/?username={TEACHER}"),
        Some(json!({ "message": "Hi", "expiration_date": "nonsense" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid date format");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/announcements/?username={TEACHER}"),
        Some(json!({
            "message": "Hi",
            "start_date": "2099-01-01T00:00:00Z",
            "expiration_date": "2099-01-01T00:00:00+00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Start date must be before expiration date");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/announcements/?username={TEACHER}"),
        Some(json!({ "message": "", "expiration_date": "2099-01-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_returns_normalized_record() {
    let app = test_app();
    let created = create(
        &app,
        json!({
            "message": "Assembly",
            "start_date": "2099-01-01T10:00:00+02:00",
            "expiration_date": "2099-01-02T00:00:00Z"
        }),
    )
    .await;

    assert!(!created["id"].as_str().unwrap().is_empty());
    assert_eq!(created["message"], "Assembly");
    assert_eq!(created["start_date"], "2099-01-01T08:00:00Z");
    assert_eq!(created["expiration_date"], "2099-01-02T00:00:00Z");
}

#[tokio::test]
async fn update_round_trip_keeps_omitted_fields() {
    let app = test_app();
    let created = create(
        &app,
        json!({
            "message": "Exam tomorrow",
            "start_date": "2024-01-01T00:00:00Z",
            "expiration_date": "2099-01-01T00:00:00Z"
        }),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/announcements/{id}?username={TEACHER}");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "message": "Exam postponed", "start_date": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "Exam postponed");
    assert_eq!(updated["start_date"], created["start_date"]);
    assert_eq!(updated["expiration_date"], created["expiration_date"]);

    let (_, all) = send(
        &app,
        Method::GET,
        &format!("/announcements/all?username={TEACHER}"),
        None,
    )
    .await;
    assert_eq!(all.as_array().unwrap()[0], updated);
}

#[tokio::test]
async fn update_error_statuses() {
    let app = test_app();
    let created = create(
        &app,
        json!({
            "message": "Exam tomorrow",
            "start_date": "2030-01-01T00:00:00Z",
            "expiration_date": "2099-01-01T00:00:00Z"
        }),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/announcements/{id}?username={TEACHER}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No fields to update");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "expiration_date": "2029-12-31T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/announcements/{id}?username=ghost"),
        Some(json!({ "message": "hijack" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/announcements/not-an-id?username={TEACHER}"),
        Some(json!({ "message": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid announcement ID");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/announcements/00000000-0000-0000-0000-000000000000?username={TEACHER}"),
        Some(json!({ "message": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Announcement not found");

    let (_, all) = send(
        &app,
        Method::GET,
        &format!("/announcements/all?username={TEACHER}"),
        None,
    )
    .await;
    assert_eq!(all.as_array().unwrap()[0], created);
}

#[tokio::test]
async fn delete_is_not_idempotent() {
    let app = test_app();
    let created = create(
        &app,
        json!({ "message": "Bye", "expiration_date": "2099-01-01T00:00:00Z" }),
    )
    .await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/announcements/{id}?username={TEACHER}");

    let (status, _) = send(&app, Method::DELETE, &format!("/announcements/{id}"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Announcement deleted successfully");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/announcements/xyz?username={TEACHER}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_metrics_respond() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    send(&app, Method::GET, "/announcements/active", None).await;
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();
    assert!(text.contains("announcements_requests_total"));
}

#[tokio::test]
async fn empty_start_date_is_no_start_date() {
    let app = test_app();
    let created = create(
        &app,
        json!({ "message": "Form post", "start_date": "", "expiration_date": "2099-01-01T00:00:00Z" }),
    )
    .await;
    assert!(created["start_date"].is_null());

    let scheduled = create(
        &app,
        json!({
            "message": "Scheduled",
            "start_date": "2098-01-01T00:00:00Z",
            "expiration_date": "2099-01-01T00:00:00Z"
        }),
    )
    .await;
    let id = scheduled["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/announcements/{id}?username={TEACHER}"),
        Some(json!({ "start_date": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["start_date"].is_null());
    assert_eq!(updated["expiration_date"], scheduled["expiration_date"]);

    let (_, active) = send(&app, Method::GET, "/announcements/active", None).await;
    assert_eq!(active.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn rejected_teachers_are_counted() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/announcements/all?username=nobody", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(text.to_vec()).unwrap();
    assert!(text.contains(r#"operation="all",outcome="unauthorized""#), "{text}");
}
