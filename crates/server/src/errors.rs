use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

const CODE_VALIDATION: u16 = 1001;
const CODE_NOT_FOUND: u16 = 1003;
const CODE_INTERNAL: u16 = 1200;

/// JSON error body: `{"error": <title>, "message": <detail>, "code": <code>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
    pub code: u16,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        let code = match status {
            StatusCode::BAD_REQUEST => CODE_VALIDATION,
            StatusCode::NOT_FOUND => CODE_NOT_FOUND,
            _ => CODE_INTERNAL,
        };
        Self { status, title, detail, code }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(detail.into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let (status, title) = if e.is_validation() {
            (StatusCode::BAD_REQUEST, "Validation Error")
        } else if e.is_not_found() {
            (StatusCode::NOT_FOUND, "Not Found")
        } else {
            error!(err = %e, "subscription storage failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        };
        Self { status, title, code: e.code(), detail: Some(e.to_string()) }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(e: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid Body", Some(e.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(e: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid Id", Some(e.body_text()))
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(e: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid Query", Some(e.body_text()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.title,
            "message": self.detail.unwrap_or_else(|| self.title.to_string()),
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Turn errors raised by tower middleware into the JSON error body.
/// An elapsed request timeout becomes 504 with the storage error code.
pub async fn handle_middleware_error(err: BoxError) -> JsonApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        error!("request timed out");
        return JsonApiError::new(StatusCode::GATEWAY_TIMEOUT, "Timeout", Some("request timed out".into()));
    }
    error!(err = %err, "unhandled middleware error");
    JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(err.to_string()))
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error("cannot bind {addr}: {reason}")]
    Bind { addr: String, reason: String },
}
