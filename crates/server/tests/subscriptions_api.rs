use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::routes::{build_router, ServerState};
use models::subscription;
use service::errors::ServiceError;
use service::subscription::{
    repository::mock::InMemorySubscriptionRepository, NewSubscription, SubscriptionFilter, SubscriptionPatch,
    SubscriptionRepository, SubscriptionService,
};

const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

/// Store whose calls never complete, like a database that stopped answering.
struct StalledRepository;

#[async_trait]
impl SubscriptionRepository for StalledRepository {
    async fn create(&self, _: &NewSubscription) -> Result<i32, ServiceError> { pending().await }
    async fn list(&self) -> Result<Vec<subscription::Model>, ServiceError> { pending().await }
    async fn get(&self, _: i32) -> Result<subscription::Model, ServiceError> { pending().await }
    async fn update(&self, _: i32, _: &SubscriptionPatch) -> Result<(), ServiceError> { pending().await }
    async fn delete(&self, _: i32) -> Result<(), ServiceError> { pending().await }
    async fn sum_by_filter(&self, _: &SubscriptionFilter) -> Result<i64, ServiceError> { pending().await }
}

fn app() -> (Arc<InMemorySubscriptionRepository>, Router) {
    let repo = Arc::new(InMemorySubscriptionRepository::default());
    let state = ServerState::new(Arc::new(SubscriptionService::new(repo.clone())));
    let router = build_router(state, CorsLayer::very_permissive(), Duration::from_secs(5));
    (repo, router)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn create(app: &Router, body: Value) -> i64 {
    let (status, v) = send(app, Method::POST, "/subscriptions/", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{v}");
    v["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let (_, app) = app();
    let (status, v) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({"status": "ok"}));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (_, app) = app();
    let (status, v) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["paths"]["/subscriptions/summary"]["get"].is_object());
}

#[tokio::test]
async fn create_then_fetch_by_id() {
    let (_, app) = app();
    let id = create(&app, json!({
        "service_name": "Yandex Plus",
        "price": 400,
        "user_id": USER,
        "start_date": "2025-07-01"
    }))
    .await;

    let (status, v) = send(&app, Method::GET, &format!("/subscriptions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["id"], json!(id));
    assert_eq!(v["service_name"], "Yandex Plus");
    assert_eq!(v["price"], 400);
    assert_eq!(v["user_id"], USER);
    assert_eq!(v["start_date"], "2025-07-01");
    assert!(v.get("end_date").is_none());

    let (status, v) = send(&app, Method::GET, "/subscriptions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_subscription_is_404() {
    let (_, app) = app();
    let (status, v) = send(&app, Method::GET, "/subscriptions/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], 1003);
    let (status, _) = send(&app, Method::DELETE, "/subscriptions/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_integer_id_is_400() {
    let (_, app) = app();
    let (status, v) = send(&app, Method::GET, "/subscriptions/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], 1001);
    assert!(v["message"].is_string());
}

#[tokio::test]
async fn delete_non_integer_id_is_400() {
    let (_, app) = app();
    let (status, v) = send(&app, Method::DELETE, "/subscriptions/x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], 1001);
    assert_eq!(v["error"], "Invalid Id");
}

#[tokio::test]
async fn update_rejects_bad_id_body_and_missing_row() {
    let (repo, app) = app();
    let id = create(&app, json!({
        "service_name": "Netflix",
        "price": 100,
        "user_id": "u1",
        "start_date": "2024-01-10"
    }))
    .await;
    let writes = repo.write_count();

    let (status, v) = send(&app, Method::PUT, "/subscriptions/abc", Some(json!({"price": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "Invalid Id");

    let req = Request::builder()
        .method(Method::PUT)
        .uri(format!("/subscriptions/{id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{bad"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let v: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(v["error"], "Invalid Body");
    assert_eq!(v["code"], 1001);

    let (status, v) = send(&app, Method::PUT, &format!("/subscriptions/{id}"), Some(json!({"price": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], 1001);

    let (status, v) = send(&app, Method::PUT, "/subscriptions/77", Some(json!({"price": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], 1003);

    assert_eq!(repo.write_count(), writes);
    let (_, v) = send(&app, Method::GET, &format!("/subscriptions/{id}"), None).await;
    assert_eq!(v["price"], 100);
}

#[tokio::test]
async fn malformed_create_never_reaches_storage() {
    let (repo, app) = app();
    let (status, v) = send(&app, Method::POST, "/subscriptions/", Some(json!({
        "price": 400,
        "user_id": USER,
        "start_date": "2025-07-01"
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], 1001);

    let (status, _) = send(&app, Method::POST, "/subscriptions/", Some(json!({
        "service_name": "Netflix",
        "price": 400,
        "user_id": USER,
        "start_date": "07-2025"
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(repo.write_count(), 0);
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let (_, app) = app();
    let id = create(&app, json!({
        "service_name": "Netflix",
        "price": 100,
        "user_id": "u1",
        "start_date": "2024-01-10"
    }))
    .await;

    let uri = format!("/subscriptions/{id}");
    let (status, v) = send(&app, Method::PUT, &uri, Some(json!({"price": 150}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({"status": "ok"}));

    let (_, v) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(v["price"], 150);
    assert_eq!(v["service_name"], "Netflix");
    assert_eq!(v["start_date"], "2024-01-10");
}

#[tokio::test]
async fn empty_update_is_ok_without_a_write() {
    let (repo, app) = app();
    let id = create(&app, json!({
        "service_name": "Netflix",
        "price": 100,
        "user_id": "u1",
        "start_date": "2024-01-10"
    }))
    .await;
    let writes = repo.write_count();

    let (status, v) = send(&app, Method::PUT, &format!("/subscriptions/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");
    assert_eq!(repo.write_count(), writes);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let (_, app) = app();
    let id = create(&app, json!({
        "service_name": "Netflix",
        "price": 100,
        "user_id": "u1",
        "start_date": "2024-01-10"
    }))
    .await;
    let uri = format!("/subscriptions/{id}");
    let (status, v) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summary_totals_prices_in_range() {
    let (_, app) = app();
    for (user, service, price, start) in [
        ("u1", "Netflix", 100, "2024-01-10"),
        ("u1", "Spotify", 50, "2024-02-10"),
        ("u2", "Netflix", 999, "2024-01-15"),
    ] {
        create(&app, json!({"service_name": service, "price": price, "user_id": user, "start_date": start})).await;
    }

    let (status, v) = send(
        &app,
        Method::GET,
        "/subscriptions/summary?user_id=u1&service_name=Netflix&from=2024-01-01&to=2024-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({"total": 100}));

    let (_, v) = send(
        &app,
        Method::GET,
        "/subscriptions/summary?user_id=u1&service_name=Spotify&from=2024-01-01&to=2024-01-31",
        None,
    )
    .await;
    assert_eq!(v["total"], 0);

    let (_, v) = send(
        &app,
        Method::GET,
        "/subscriptions/summary?user_id=nobody&service_name=Netflix&from=2000-01-01&to=2100-01-01",
        None,
    )
    .await;
    assert_eq!(v["total"], 0);
}

#[tokio::test]
async fn summary_rejects_bad_parameters() {
    let (_, app) = app();
    let (status, v) = send(&app, Method::GET, "/subscriptions/summary?user_id=u1&from=2024-01-01", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = v["message"].as_str().unwrap();
    assert!(message.contains("service_name") && message.contains("to"), "{message}");

    let (status, _) = send(
        &app,
        Method::GET,
        "/subscriptions/summary?user_id=u1&service_name=Netflix&from=2024-05-01&to=2024-01-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        "/subscriptions/summary?user_id=u1&service_name=Netflix&from=01.01.2024&to=2024-01-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failure_is_500() {
    let (repo, app) = app();
    repo.set_unavailable(true);
    let (status, v) = send(&app, Method::GET, "/subscriptions/", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["code"], 1200);
    assert_eq!(v["error"], "Internal Server Error");
}

#[tokio::test]
async fn stalled_store_times_out_with_json_error() {
    let state = ServerState::new(Arc::new(SubscriptionService::new(Arc::new(StalledRepository))));
    let app = build_router(state, CorsLayer::very_permissive(), Duration::from_millis(100));

    let res = app
        .oneshot(Request::builder().uri("/subscriptions/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    let content_type = res.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_owned);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let v: Value = serde_json::from_slice(&to_bytes(res.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(v["error"], "Timeout");
    assert_eq!(v["code"], 1200);
}
