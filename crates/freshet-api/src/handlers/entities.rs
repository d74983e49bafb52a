//! Read handlers for shared entities (devices, personas, profiles).

use axum::{
  Json,
  extract::{Path, State},
};
use freshet_core::{
  entity::{Device, Persona, Profile},
  store::SurveyStore as _,
};

use crate::{AppState, error::ApiError};

/// `GET /devices/:id`
pub async fn get_device(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<Device>, ApiError> {
  let device = state
    .store
    .get_device(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("device {id} not found")))?;
  Ok(Json(device))
}

/// `GET /personas/:id`
pub async fn get_persona(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<Persona>, ApiError> {
  let persona = state
    .store
    .get_persona(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("persona {id} not found")))?;
  Ok(Json(persona))
}

/// `GET /profiles/:id`
pub async fn get_profile(
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Json<Profile>, ApiError> {
  let profile = state
    .store
    .get_profile(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("profile {id} not found")))?;
  Ok(Json(profile))
}
