//! Submission — the in-memory representation of one field-survey visit.
//!
//! Produced by the boundary layer from a structurally-validated request.
//! The ingestion core treats a [`Submission`] as read-only: it checks
//! referential consistency among its own writes, never request shape.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Which stratum a vegetation observation belongs to. Decides both the
/// vegetation table and the junction table used for its cross-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VegetationContext {
  Shore,
  Water,
}

// ─── Envelope facts ──────────────────────────────────────────────────────────

/// The monitoring visit this survey belongs to.
///
/// `number` is the caller-supplied visit sequence; the store never invents
/// it. Season and hydrological year are optional campaign labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitFacts {
  pub number:            i64,
  pub season:            Option<String>,
  pub hydrological_year: Option<String>,
}

/// Arrival/departure window, geolocation, and free-form notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeFacts {
  pub arrival_time:   DateTime<Utc>,
  pub departure_time: DateTime<Utc>,
  pub latitude:       f64,
  pub longitude:      f64,
  pub observations:   Option<String>,
}

/// Weather snapshot taken during the visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherFacts {
  pub air_temp:      f64,
  pub cloudiness:    String,
  pub wind_status:   String,
  pub wind_velocity: f64,
  pub precipitation: String,
}

/// Stream gauge measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeFacts {
  pub gauge:         f64,
  pub area:          f64,
  pub average_speed: f64,
  pub width:         f64,
  pub depth_factor:  f64,
  pub observations:  Option<String>,
}

/// River-specific facts for this visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverFacts {
  pub status:      String,
  pub water_color: String,
}

// ─── Shared-entity references ────────────────────────────────────────────────

/// A measuring device, identified by a caller-chosen id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRef {
  pub id:    i64,
  pub make:  String,
  pub model: String,
  pub owner: String,
}

/// A participating person, identified by a caller-chosen id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaRef {
  pub id:          i64,
  pub first_name:  String,
  pub last_name:   String,
  pub id_document: String,
  pub affiliation: String,
}

/// A sampling profile, identified by a caller-chosen id; `code` is unique
/// store-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRef {
  pub id:                      i64,
  pub site_id:                 i64,
  pub code:                    String,
  pub mix_criteria:            Option<String>,
  pub mix_notes:               Option<String>,
  pub stratification_criteria: Option<String>,
  pub stratification_notes:    Option<String>,
}

/// A vegetation observation. `id` is submission-local: it only has to match
/// the ids used by this submission's vegetation links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegetationRef {
  pub id:      i64,
  pub name:    String,
  pub context: VegetationContext,
}

// ─── Cross-references ────────────────────────────────────────────────────────

/// Ties one listed device to this submission's envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLink {
  pub device_id: i64,
  pub category:  String,
}

/// Ties one listed persona to this submission's envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaLink {
  pub persona_id: i64,
  pub role:       String,
}

/// Ties one listed vegetation entry to this submission's river metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VegetationLink {
  pub vegetation_id: i64,
}

// ─── Samples ─────────────────────────────────────────────────────────────────

/// One physical sample drawn at a sampled depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleEntry {
  pub number:       i64,
  pub time:         NaiveTime,
  pub profile_id:   i64,
  pub observations: Option<String>,
  pub laboratory:   Option<String>,
}

/// All samples drawn at one depth. Each group becomes one record row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleGroup {
  pub depth:   f64,
  pub samples: Vec<SampleEntry>,
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// One fully-parsed field-survey submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
  pub site_id:          i64,
  pub visit:            VisitFacts,
  pub envelope:         EnvelopeFacts,
  pub weather:          WeatherFacts,
  pub gauge:            GaugeFacts,
  pub river:            RiverFacts,
  #[serde(default)]
  pub devices:          Vec<DeviceRef>,
  #[serde(default)]
  pub device_links:     Vec<DeviceLink>,
  #[serde(default)]
  pub personas:         Vec<PersonaRef>,
  #[serde(default)]
  pub persona_links:    Vec<PersonaLink>,
  #[serde(default)]
  pub profiles:         Vec<ProfileRef>,
  #[serde(default)]
  pub sample_groups:    Vec<SampleGroup>,
  #[serde(default)]
  pub vegetation:       Vec<VegetationRef>,
  #[serde(default)]
  pub vegetation_links: Vec<VegetationLink>,
}

impl Submission {
  /// Find the vegetation entry a link points at, if the submission lists it.
  pub fn vegetation_entry(&self, id: i64) -> Option<&VegetationRef> {
    self.vegetation.iter().find(|v| v.id == id)
  }
}
