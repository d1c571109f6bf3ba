use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::subscription::SubscriptionService;

use crate::errors::handle_middleware_error;
use crate::openapi::ApiDoc;

pub mod subscriptions;

/// Shared handler state; constructed once at startup and cloned per request.
#[derive(Clone)]
pub struct ServerState {
    pub subscriptions: Arc<SubscriptionService>,
}

impl ServerState {
    pub fn new(subscriptions: Arc<SubscriptionService>) -> Self { Self { subscriptions } }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: health, OpenAPI document and subscription CRUD.
pub fn build_router(state: ServerState, cors: CorsLayer, request_timeout: Duration) -> Router {
    let subscription_routes = Router::new()
        .route("/subscriptions", get(subscriptions::list).post(subscriptions::create))
        .route("/subscriptions/", get(subscriptions::list).post(subscriptions::create))
        .route("/subscriptions/summary", get(subscriptions::summary))
        .route(
            "/subscriptions/:id",
            get(subscriptions::get_one)
                .put(subscriptions::update)
                .delete(subscriptions::delete),
        );

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(subscription_routes)
        .with_state(state)
        // a timed-out request drops the handler future, and its query with it
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
