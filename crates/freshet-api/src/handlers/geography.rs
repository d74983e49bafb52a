//! Handlers for reference-geography management.
//!
//! Water bodies and sites are maintained outside the ingestion transaction;
//! submissions only reference them by id.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use freshet_core::{entity::NewSite, store::SurveyStore as _};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct NewWaterBody {
  pub name: String,
}

/// `POST /water-bodies` — body: `{"name":"..."}`
pub async fn create_water_body(
  State(state): State<AppState>,
  Json(body): Json<NewWaterBody>,
) -> Result<impl IntoResponse, ApiError> {
  let water_body = state
    .store
    .add_water_body(body.name)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(water_body)))
}

/// `POST /sites` — body: [`NewSite`]
pub async fn create_site(
  State(state): State<AppState>,
  Json(body): Json<NewSite>,
) -> Result<impl IntoResponse, ApiError> {
  let site =
    state.store.add_site(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(site)))
}
