//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] freshet_store_sqlite::Error),
}

impl ApiError {
  /// Classify a store error into a client-meaningful status.
  ///
  /// Unresolved references and unknown sites are the caller's fault (422);
  /// a natural-key conflict that survived the store's retry is 409;
  /// everything else is an internal failure.
  pub fn from_store(e: freshet_store_sqlite::Error) -> Self {
    use freshet_core::Error as CoreError;
    use freshet_store_sqlite::Error as StoreError;

    match e {
      StoreError::Core(c @ CoreError::UnresolvedReference { .. }) => {
        ApiError::Unprocessable(c.to_string())
      }
      StoreError::Core(c @ CoreError::ResolveConflict { .. }) => {
        ApiError::Conflict(c.to_string())
      }
      e @ StoreError::UnknownSite(_) => ApiError::Unprocessable(e.to_string()),
      other => ApiError::Store(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
