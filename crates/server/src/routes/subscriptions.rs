use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use common::types::StatusOk;
use service::subscription::{NewSubscription, SubscriptionPatch};

use crate::{errors::JsonApiError, routes::ServerState};

#[derive(Debug, Serialize)]
pub struct CreatedOutput { pub id: i32 }

#[derive(Debug, Serialize)]
pub struct SummaryOutput { pub total: i64 }

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Owner of the subscriptions
    pub user_id: Option<String>,
    /// Exact service name
    pub service_name: Option<String>,
    /// First start date, inclusive (YYYY-MM-DD)
    pub from: Option<String>,
    /// Last start date, inclusive (YYYY-MM-DD)
    pub to: Option<String>,
}

impl SummaryQuery {
    /// Names of the required parameters that are absent or blank.
    fn missing(&self) -> Vec<&'static str> {
        [
            ("user_id", &self.user_id),
            ("service_name", &self.service_name),
            ("from", &self.from),
            ("to", &self.to),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

#[utoipa::path(
    post, path = "/subscriptions/", tag = "subscriptions",
    request_body = crate::openapi::CreateSubscriptionDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CreatedDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Create Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<NewSubscription>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedOutput>), JsonApiError> {
    let Json(input) = body?;
    let id = state.subscriptions.create(input).await?;
    Ok((StatusCode::CREATED, Json(CreatedOutput { id })))
}

#[utoipa::path(
    get, path = "/subscriptions/", tag = "subscriptions",
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::SubscriptionDoc]),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<models::subscription::Model>>, JsonApiError> {
    let rows = state.subscriptions.list().await?;
    info!(count = rows.len(), "list subscriptions");
    Ok(Json(rows))
}

#[utoipa::path(
    get, path = "/subscriptions/summary", tag = "subscriptions",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Total price over the period", body = crate::openapi::SummaryDoc),
        (status = 400, description = "Missing parameter or invalid period", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn summary(
    State(state): State<ServerState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SummaryOutput>, JsonApiError> {
    let Query(q) = query?;
    let missing = q.missing();
    if !missing.is_empty() {
        return Err(JsonApiError::validation(format!("missing query parameters: {}", missing.join(", "))));
    }
    let total = state
        .subscriptions
        .sum_by_period(
            q.user_id.as_deref().unwrap_or_default(),
            q.service_name.as_deref().unwrap_or_default(),
            q.from.as_deref().unwrap_or_default(),
            q.to.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(SummaryOutput { total }))
}

#[utoipa::path(
    get, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::SubscriptionDoc),
        (status = 400, description = "Invalid Id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_one(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<models::subscription::Model>, JsonApiError> {
    let Path(id) = id?;
    let found = state.subscriptions.get(id).await?;
    Ok(Json(found))
}

#[utoipa::path(
    put, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    request_body = crate::openapi::UpdateSubscriptionDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::StatusDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<SubscriptionPatch>, JsonRejection>,
) -> Result<Json<StatusOk>, JsonApiError> {
    let Path(id) = id?;
    let Json(patch) = body?;
    state.subscriptions.update(id, patch).await?;
    Ok(Json(StatusOk::default()))
}

#[utoipa::path(
    delete, path = "/subscriptions/{id}", tag = "subscriptions",
    params(("id" = i32, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::StatusDoc),
        (status = 400, description = "Invalid Id", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<StatusOk>, JsonApiError> {
    let Path(id) = id?;
    state.subscriptions.delete(id).await?;
    Ok(Json(StatusOk::default()))
}
