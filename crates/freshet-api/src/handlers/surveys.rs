//! Handlers for `/surveys` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/surveys` | Body: a full [`Submission`]; 201 + receipt |
//! | `GET`  | `/surveys` | All ingested submissions, oldest first |
//! | `GET`  | `/surveys/:id` | Full materialised graph; 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use freshet_core::{
  entity::{SurveySummary, SurveyView},
  store::SurveyStore as _,
  submission::Submission,
};

use crate::{AppState, error::ApiError};

/// `POST /surveys` — ingest one submission as a single transaction.
pub async fn create(
  State(state): State<AppState>,
  Json(submission): Json<Submission>,
) -> Result<impl IntoResponse, ApiError> {
  let receipt = state
    .store
    .ingest(submission)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(receipt)))
}

/// `GET /surveys`
pub async fn list(
  State(state): State<AppState>,
) -> Result<Json<Vec<SurveySummary>>, ApiError> {
  let summaries =
    state.store.list_surveys().await.map_err(ApiError::from_store)?;
  Ok(Json(summaries))
}

/// `GET /surveys/:id`
pub async fn get_one(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<SurveyView>, ApiError> {
  let view = state
    .store
    .get_survey(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("survey {id} not found")))?;
  Ok(Json(view))
}
