//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, sample times as `HH:MM:SS`.

use chrono::{DateTime, NaiveTime, Utc};
use freshet_core::entity::{RecordMetadata, Sample, SurveySummary, Visit};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveTime ───────────────────────────────────────────────────────────────

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `record_metadata` row.
pub struct RawRecordMetadata {
  pub id:             i64,
  pub visit_id:       i64,
  pub weather_id:     i64,
  pub arrival_time:   String,
  pub departure_time: String,
  pub latitude:       f64,
  pub longitude:      f64,
  pub observations:   Option<String>,
}

impl RawRecordMetadata {
  pub fn into_record_metadata(self) -> Result<RecordMetadata> {
    Ok(RecordMetadata {
      id:             self.id,
      visit_id:       self.visit_id,
      weather_id:     self.weather_id,
      arrival_time:   decode_dt(&self.arrival_time)?,
      departure_time: decode_dt(&self.departure_time)?,
      latitude:       self.latitude,
      longitude:      self.longitude,
      observations:   self.observations,
    })
  }
}

/// Raw strings read directly from a `visit` row.
pub struct RawVisit {
  pub id:                i64,
  pub number:            i64,
  pub date:              String,
  pub season:            Option<String>,
  pub hydrological_year: Option<String>,
}

impl RawVisit {
  pub fn into_visit(self) -> Result<Visit> {
    Ok(Visit {
      id:                self.id,
      number:            self.number,
      date:              decode_dt(&self.date)?,
      season:            self.season,
      hydrological_year: self.hydrological_year,
    })
  }
}

/// Raw strings read directly from a `sample` row.
pub struct RawSample {
  pub id:           i64,
  pub number:       i64,
  pub time:         String,
  pub record_id:    i64,
  pub profile_id:   i64,
  pub observations: Option<String>,
  pub laboratory:   Option<String>,
}

impl RawSample {
  pub fn into_sample(self) -> Result<Sample> {
    Ok(Sample {
      id:           self.id,
      number:       self.number,
      time:         decode_time(&self.time)?,
      record_id:    self.record_id,
      profile_id:   self.profile_id,
      observations: self.observations,
      laboratory:   self.laboratory,
    })
  }
}

/// Raw strings backing one survey-listing row.
pub struct RawSummary {
  pub record_metadata_id: i64,
  pub river_metadata_id:  i64,
  pub site_id:            i64,
  pub arrival_time:       String,
}

impl RawSummary {
  pub fn into_summary(self) -> Result<SurveySummary> {
    Ok(SurveySummary {
      record_metadata_id: self.record_metadata_id,
      river_metadata_id:  self.river_metadata_id,
      site_id:            self.site_id,
      arrival_time:       decode_dt(&self.arrival_time)?,
    })
  }
}
