//! Persisted rows and the materialised read models built from them.
//!
//! Surrogate ids are store-assigned integers, except device / persona /
//! profile, whose ids are caller-chosen and honored on first insert.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::submission::VegetationContext;

// ─── Reference geography ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterBody {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
  pub id:            i64,
  pub name:          String,
  pub abbreviation:  Option<String>,
  pub water_body_id: i64,
}

/// Input for [`crate::store::SurveyStore::add_site`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSite {
  pub name:          String,
  pub abbreviation:  Option<String>,
  pub water_body_id: i64,
}

// ─── Per-submission rows ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
  pub id:            i64,
  pub air_temp:      f64,
  pub cloudiness:    String,
  pub wind_status:   String,
  pub wind_velocity: f64,
  pub precipitation: String,
}

/// The monitoring visit marker. `date` is the envelope arrival time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
  pub id:                i64,
  pub number:            i64,
  pub date:              DateTime<Utc>,
  pub season:            Option<String>,
  pub hydrological_year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeReading {
  pub id:            i64,
  pub gauge:         f64,
  pub area:          f64,
  pub average_speed: f64,
  pub width:         f64,
  pub depth_factor:  f64,
  pub observations:  Option<String>,
}

/// The submission envelope row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
  pub id:             i64,
  pub visit_id:       i64,
  pub weather_id:     i64,
  pub arrival_time:   DateTime<Utc>,
  pub departure_time: DateTime<Utc>,
  pub latitude:       f64,
  pub longitude:      f64,
  pub observations:   Option<String>,
}

/// River-specific envelope, 1:1 with its [`RecordMetadata`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverMetadata {
  pub id:                 i64,
  pub record_metadata_id: i64,
  pub river_status:       String,
  pub gauge_reading_id:   i64,
  pub water_color:        String,
  pub site_id:            i64,
}

/// One sampled depth within a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
  pub id:                 i64,
  pub depth:              f64,
  pub record_metadata_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
  pub id:           i64,
  pub number:       i64,
  pub time:         NaiveTime,
  pub record_id:    i64,
  pub profile_id:   i64,
  pub observations: Option<String>,
  pub laboratory:   Option<String>,
}

// ─── Shared rows ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
  pub id:    i64,
  pub make:  String,
  pub model: String,
  pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
  pub id:          i64,
  pub first_name:  String,
  pub last_name:   String,
  pub id_document: String,
  pub affiliation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub id:                      i64,
  pub site_id:                 i64,
  pub code:                    String,
  pub mix_criteria:            Option<String>,
  pub mix_notes:               Option<String>,
  pub stratification_criteria: Option<String>,
  pub stratification_notes:    Option<String>,
}

/// A vegetation row from either context table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vegetation {
  pub id:      i64,
  pub name:    String,
  pub context: VegetationContext,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// One device used during a visit, with the category it was used as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceUse {
  pub device:   Device,
  pub category: String,
}

/// One participant of a visit, with their stated role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
  pub persona: Persona,
  pub role:    String,
}

/// A sampled depth with its samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSamples {
  pub record:  Record,
  pub samples: Vec<Sample>,
}

/// The fully materialised graph of one ingested submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyView {
  pub metadata:         RecordMetadata,
  pub river:            RiverMetadata,
  pub weather:          Weather,
  pub visit:            Visit,
  pub gauge:            GaugeReading,
  pub devices:          Vec<DeviceUse>,
  pub crew:             Vec<CrewMember>,
  pub records:          Vec<RecordSamples>,
  pub shore_vegetation: Vec<Vegetation>,
  pub water_vegetation: Vec<Vegetation>,
}

/// One row of the survey listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySummary {
  pub record_metadata_id: i64,
  pub river_metadata_id:  i64,
  pub site_id:            i64,
  pub arrival_time:       DateTime<Utc>,
}
