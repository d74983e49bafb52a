//! JSON/HTTP boundary for the Freshet survey store.
//!
//! Deliberately thin: serde does the shape validation, handlers translate
//! store results into status codes, and everything of substance happens
//! inside the store's ingestion transaction. Auth, TLS, and transport
//! concerns are the caller's responsibility.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::path::PathBuf;

use axum::{
  Router,
  routing::{get, post},
};
use freshet_store_sqlite::SqliteStore;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `FRESHET_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. The store clones cheaply;
/// no other state exists.
#[derive(Clone)]
pub struct AppState {
  pub store: SqliteStore,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router.
pub fn router(state: AppState) -> Router {
  Router::new()
    // Submissions
    .route(
      "/surveys",
      get(handlers::surveys::list).post(handlers::surveys::create),
    )
    .route("/surveys/{id}", get(handlers::surveys::get_one))
    // Reference geography
    .route("/water-bodies", post(handlers::geography::create_water_body))
    .route("/sites", post(handlers::geography::create_site))
    // Shared-entity reads
    .route("/devices/{id}", get(handlers::entities::get_device))
    .route("/personas/{id}", get(handlers::entities::get_persona))
    .route("/profiles/{id}", get(handlers::entities::get_profile))
    .with_state(state)
}

#[cfg(test)]
mod tests;
