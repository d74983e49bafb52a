//! The `SurveyStore` trait and the ingest receipt type.
//!
//! The trait is implemented by storage backends (e.g. `freshet-store-sqlite`).
//! Higher layers (`freshet-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  entity::{
    Device, NewSite, Persona, Profile, Site, SurveySummary, SurveyView,
    Vegetation, WaterBody,
  },
  submission::{Submission, VegetationContext},
};

// ─── Receipt ─────────────────────────────────────────────────────────────────

/// What one successful ingest committed.
///
/// `created_refs` / `reused_refs` count shared entities (devices, personas,
/// profiles, vegetation) that were inserted for the first time vs. resolved
/// to pre-existing rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReceipt {
  pub record_metadata_id: i64,
  pub river_metadata_id:  i64,
  pub records:            usize,
  pub samples:            usize,
  pub device_links:       usize,
  pub persona_links:      usize,
  pub vegetation_links:   usize,
  pub created_refs:       usize,
  pub reused_refs:        usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Freshet survey store backend.
///
/// [`SurveyStore::ingest`] is the single write entry point for submissions:
/// one call, one all-or-nothing transaction. Reference geography is managed
/// separately through `add_water_body` / `add_site`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SurveyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Durably record one submission as a cross-referenced entity graph.
  ///
  /// Either every row of the graph is committed or none is. Shared entities
  /// referenced by the submission are resolved by natural key and reused
  /// when they already exist; their stored attributes are never updated.
  fn ingest(
    &self,
    submission: Submission,
  ) -> impl Future<Output = Result<IngestReceipt, Self::Error>> + Send + '_;

  // ── Reference geography ───────────────────────────────────────────────

  /// Create a water body and return the persisted row.
  fn add_water_body(
    &self,
    name: String,
  ) -> impl Future<Output = Result<WaterBody, Self::Error>> + Send + '_;

  /// Create a monitoring site on an existing water body.
  fn add_site(
    &self,
    site: NewSite,
  ) -> impl Future<Output = Result<Site, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Materialise the full graph of one ingested submission. Returns `None`
  /// if no envelope with that id exists.
  fn get_survey(
    &self,
    record_metadata_id: i64,
  ) -> impl Future<Output = Result<Option<SurveyView>, Self::Error>> + Send + '_;

  /// List all ingested submissions, oldest first.
  fn list_surveys(
    &self,
  ) -> impl Future<Output = Result<Vec<SurveySummary>, Self::Error>> + Send + '_;

  /// Retrieve a device by its caller-chosen id.
  fn get_device(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Device>, Self::Error>> + Send + '_;

  /// Retrieve a persona by its caller-chosen id.
  fn get_persona(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Persona>, Self::Error>> + Send + '_;

  /// Retrieve a profile by its caller-chosen id.
  fn get_profile(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Look up a vegetation row by its natural key `(context, name)`.
  fn find_vegetation<'a>(
    &'a self,
    context: VegetationContext,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Vegetation>, Self::Error>> + Send + 'a;
}
