//! Metadata writer: the per-submission rows, in foreign-key dependency order.

use freshet_core::{
  error::RefKind,
  submission::Submission,
};
use rusqlite::{OptionalExtension as _, Transaction, params};

use super::resolver::Resolved;
use crate::{
  Error, Result,
  encode::{encode_dt, encode_time},
};

/// Ids of the five envelope rows. Later stages hang everything off these.
pub(super) struct EnvelopeIds {
  pub record_metadata_id: i64,
  pub river_metadata_id:  i64,
}

/// Insert the envelope chain: weather → visit → record_metadata →
/// gauge_reading → river_metadata. Each step's id feeds the next insert.
pub(super) fn write_envelope(
  tx: &Transaction<'_>,
  s: &Submission,
) -> Result<EnvelopeIds> {
  // The site must pre-exist; it is reference geography, not submission data.
  let site_exists: bool = tx
    .query_row("SELECT 1 FROM site WHERE id = ?1", params![s.site_id], |_| {
      Ok(true)
    })
    .optional()?
    .unwrap_or(false);
  if !site_exists {
    return Err(Error::UnknownSite(s.site_id));
  }

  tx.execute(
    "INSERT INTO weather (air_temp, cloudiness, wind_status, wind_velocity, precipitation)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      s.weather.air_temp,
      s.weather.cloudiness,
      s.weather.wind_status,
      s.weather.wind_velocity,
      s.weather.precipitation,
    ],
  )?;
  let weather_id = tx.last_insert_rowid();

  // The visit date is the envelope arrival time; the sequence number comes
  // from the caller, never from the store.
  tx.execute(
    "INSERT INTO visit (number, date, season, hydrological_year)
     VALUES (?1, ?2, ?3, ?4)",
    params![
      s.visit.number,
      encode_dt(s.envelope.arrival_time),
      s.visit.season,
      s.visit.hydrological_year,
    ],
  )?;
  let visit_id = tx.last_insert_rowid();

  tx.execute(
    "INSERT INTO record_metadata
       (visit_id, weather_id, arrival_time, departure_time, latitude, longitude, observations)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      visit_id,
      weather_id,
      encode_dt(s.envelope.arrival_time),
      encode_dt(s.envelope.departure_time),
      s.envelope.latitude,
      s.envelope.longitude,
      s.envelope.observations,
    ],
  )?;
  let record_metadata_id = tx.last_insert_rowid();

  tx.execute(
    "INSERT INTO gauge_reading (gauge, area, average_speed, width, depth_factor, observations)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      s.gauge.gauge,
      s.gauge.area,
      s.gauge.average_speed,
      s.gauge.width,
      s.gauge.depth_factor,
      s.gauge.observations,
    ],
  )?;
  let gauge_reading_id = tx.last_insert_rowid();

  tx.execute(
    "INSERT INTO river_metadata
       (record_metadata_id, river_status, gauge_reading_id, water_color, site_id)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      record_metadata_id,
      s.river.status,
      gauge_reading_id,
      s.river.water_color,
      s.site_id,
    ],
  )?;
  let river_metadata_id = tx.last_insert_rowid();

  Ok(EnvelopeIds { record_metadata_id, river_metadata_id })
}

/// Insert one record row per sampled depth group, then that group's samples.
///
/// Runs after resolution so each sample's profile reference can be checked
/// against the submission's own profile list instead of trusting a raw id.
/// Returns `(records, samples)` counts.
pub(super) fn write_sample_groups(
  tx: &Transaction<'_>,
  s: &Submission,
  envelope: &EnvelopeIds,
  resolved: &Resolved,
) -> Result<(usize, usize)> {
  let mut samples = 0;

  for group in &s.sample_groups {
    tx.execute(
      "INSERT INTO record (depth, record_metadata_id) VALUES (?1, ?2)",
      params![group.depth, envelope.record_metadata_id],
    )?;
    let record_id = tx.last_insert_rowid();

    for entry in &group.samples {
      let profile_id = resolved.profile(entry.profile_id).ok_or(
        freshet_core::Error::UnresolvedReference {
          kind: RefKind::Profile,
          id:   entry.profile_id,
        },
      )?;
      tx.execute(
        "INSERT INTO sample (number, time, record_id, profile_id, observations, laboratory)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
          entry.number,
          encode_time(entry.time),
          record_id,
          profile_id,
          entry.observations,
          entry.laboratory,
        ],
      )?;
      samples += 1;
    }
  }

  Ok((s.sample_groups.len(), samples))
}
