//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tutela_core::Error as LifecycleError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("render error: {0}")]
  Render(String),

  #[error(transparent)]
  Lifecycle(#[from] LifecycleError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Render(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      ApiError::Lifecycle(e) => (lifecycle_status(e), e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// Map lifecycle errors onto HTTP statuses. `ConsentInvalid` is a flat
/// 403 everywhere except the verify endpoint, which converts it to an
/// undifferentiated [`ApiError::NotFound`] before it gets here.
fn lifecycle_status(error: &LifecycleError) -> StatusCode {
  match error {
    LifecycleError::InvalidSubject(_) | LifecycleError::SubjectNotFound(_) => {
      StatusCode::NOT_FOUND
    }
    LifecycleError::ConsentInvalid => StatusCode::FORBIDDEN,
    LifecycleError::ErasureIncomplete { .. }
    | LifecycleError::AuditWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    LifecycleError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    LifecycleError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
  }
}
