//! [`SqliteStore`] — the SQLite implementation of [`SurveyStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use freshet_core::{
  entity::{
    CrewMember, Device, DeviceUse, GaugeReading, NewSite, Persona, Profile,
    Record, RecordSamples, RiverMetadata, Site, SurveySummary, SurveyView,
    Vegetation, WaterBody, Weather,
  },
  store::{IngestReceipt, SurveyStore},
  submission::{Submission, VegetationContext},
};

use crate::{
  Result,
  encode::{RawRecordMetadata, RawSample, RawSummary, RawVisit},
  ingest,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Freshet survey store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Each ingest
/// call runs on its own transaction; the store keeps no per-request state.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Raw read bundle ─────────────────────────────────────────────────────────

/// Everything one `get_survey` call reads, with datetimes still encoded.
/// Collected inside a single connection call so the view is one snapshot.
struct RawSurveyBundle {
  metadata: RawRecordMetadata,
  river:    RiverMetadata,
  weather:  Weather,
  visit:    RawVisit,
  gauge:    GaugeReading,
  devices:  Vec<DeviceUse>,
  crew:     Vec<CrewMember>,
  records:  Vec<Record>,
  samples:  Vec<RawSample>,
  shore:    Vec<Vegetation>,
  water:    Vec<Vegetation>,
}

fn read_survey_bundle(
  conn: &rusqlite::Connection,
  record_metadata_id: i64,
) -> rusqlite::Result<Option<RawSurveyBundle>> {
  let metadata = conn
    .query_row(
      "SELECT id, visit_id, weather_id, arrival_time, departure_time,
              latitude, longitude, observations
       FROM record_metadata WHERE id = ?1",
      rusqlite::params![record_metadata_id],
      |row| {
        Ok(RawRecordMetadata {
          id:             row.get(0)?,
          visit_id:       row.get(1)?,
          weather_id:     row.get(2)?,
          arrival_time:   row.get(3)?,
          departure_time: row.get(4)?,
          latitude:       row.get(5)?,
          longitude:      row.get(6)?,
          observations:   row.get(7)?,
        })
      },
    )
    .optional()?;

  let metadata = match metadata {
    Some(m) => m,
    None => return Ok(None),
  };

  let river = conn.query_row(
    "SELECT id, record_metadata_id, river_status, gauge_reading_id, water_color, site_id
     FROM river_metadata WHERE record_metadata_id = ?1",
    rusqlite::params![record_metadata_id],
    |row| {
      Ok(RiverMetadata {
        id:                 row.get(0)?,
        record_metadata_id: row.get(1)?,
        river_status:       row.get(2)?,
        gauge_reading_id:   row.get(3)?,
        water_color:        row.get(4)?,
        site_id:            row.get(5)?,
      })
    },
  )?;

  let weather = conn.query_row(
    "SELECT id, air_temp, cloudiness, wind_status, wind_velocity, precipitation
     FROM weather WHERE id = ?1",
    rusqlite::params![metadata.weather_id],
    |row| {
      Ok(Weather {
        id:            row.get(0)?,
        air_temp:      row.get(1)?,
        cloudiness:    row.get(2)?,
        wind_status:   row.get(3)?,
        wind_velocity: row.get(4)?,
        precipitation: row.get(5)?,
      })
    },
  )?;

  let visit = conn.query_row(
    "SELECT id, number, date, season, hydrological_year FROM visit WHERE id = ?1",
    rusqlite::params![metadata.visit_id],
    |row| {
      Ok(RawVisit {
        id:                row.get(0)?,
        number:            row.get(1)?,
        date:              row.get(2)?,
        season:            row.get(3)?,
        hydrological_year: row.get(4)?,
      })
    },
  )?;

  let gauge = conn.query_row(
    "SELECT id, gauge, area, average_speed, width, depth_factor, observations
     FROM gauge_reading WHERE id = ?1",
    rusqlite::params![river.gauge_reading_id],
    |row| {
      Ok(GaugeReading {
        id:            row.get(0)?,
        gauge:         row.get(1)?,
        area:          row.get(2)?,
        average_speed: row.get(3)?,
        width:         row.get(4)?,
        depth_factor:  row.get(5)?,
        observations:  row.get(6)?,
      })
    },
  )?;

  let mut stmt = conn.prepare(
    "SELECT d.id, d.make, d.model, d.owner, j.category
     FROM device_record_metadata j
     JOIN device d ON d.id = j.device_id
     WHERE j.record_metadata_id = ?1
     ORDER BY j.id",
  )?;
  let devices = stmt
    .query_map(rusqlite::params![record_metadata_id], |row| {
      Ok(DeviceUse {
        device:   Device {
          id:    row.get(0)?,
          make:  row.get(1)?,
          model: row.get(2)?,
          owner: row.get(3)?,
        },
        category: row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT p.id, p.first_name, p.last_name, p.id_document, p.affiliation, j.role
     FROM persona_record_metadata j
     JOIN persona p ON p.id = j.persona_id
     WHERE j.record_metadata_id = ?1
     ORDER BY j.id",
  )?;
  let crew = stmt
    .query_map(rusqlite::params![record_metadata_id], |row| {
      Ok(CrewMember {
        persona: Persona {
          id:          row.get(0)?,
          first_name:  row.get(1)?,
          last_name:   row.get(2)?,
          id_document: row.get(3)?,
          affiliation: row.get(4)?,
        },
        role:    row.get(5)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT id, depth, record_metadata_id FROM record
     WHERE record_metadata_id = ?1 ORDER BY id",
  )?;
  let records = stmt
    .query_map(rusqlite::params![record_metadata_id], |row| {
      Ok(Record {
        id:                 row.get(0)?,
        depth:              row.get(1)?,
        record_metadata_id: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT s.id, s.number, s.time, s.record_id, s.profile_id, s.observations, s.laboratory
     FROM sample s
     JOIN record r ON r.id = s.record_id
     WHERE r.record_metadata_id = ?1
     ORDER BY s.id",
  )?;
  let samples = stmt
    .query_map(rusqlite::params![record_metadata_id], |row| {
      Ok(RawSample {
        id:           row.get(0)?,
        number:       row.get(1)?,
        time:         row.get(2)?,
        record_id:    row.get(3)?,
        profile_id:   row.get(4)?,
        observations: row.get(5)?,
        laboratory:   row.get(6)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT v.id, v.name FROM river_shore_vegetation j
     JOIN shore_vegetation v ON v.id = j.shore_vegetation_id
     WHERE j.river_metadata_id = ?1
     ORDER BY j.id",
  )?;
  let shore = stmt
    .query_map(rusqlite::params![river.id], |row| {
      Ok(Vegetation {
        id:      row.get(0)?,
        name:    row.get(1)?,
        context: VegetationContext::Shore,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(
    "SELECT v.id, v.name FROM river_water_vegetation j
     JOIN water_vegetation v ON v.id = j.water_vegetation_id
     WHERE j.river_metadata_id = ?1
     ORDER BY j.id",
  )?;
  let water = stmt
    .query_map(rusqlite::params![river.id], |row| {
      Ok(Vegetation {
        id:      row.get(0)?,
        name:    row.get(1)?,
        context: VegetationContext::Water,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(RawSurveyBundle {
    metadata,
    river,
    weather,
    visit,
    gauge,
    devices,
    crew,
    records,
    samples,
    shore,
    water,
  }))
}

impl RawSurveyBundle {
  fn into_view(self) -> Result<SurveyView> {
    let mut records: Vec<RecordSamples> = self
      .records
      .into_iter()
      .map(|record| RecordSamples { record, samples: Vec::new() })
      .collect();

    for raw in self.samples {
      let sample = raw.into_sample()?;
      if let Some(rs) =
        records.iter_mut().find(|rs| rs.record.id == sample.record_id)
      {
        rs.samples.push(sample);
      }
    }

    Ok(SurveyView {
      metadata:         self.metadata.into_record_metadata()?,
      river:            self.river,
      weather:          self.weather,
      visit:            self.visit.into_visit()?,
      gauge:            self.gauge,
      devices:          self.devices,
      crew:             self.crew,
      records,
      shore_vegetation: self.shore,
      water_vegetation: self.water,
    })
  }
}

// ─── SurveyStore impl ────────────────────────────────────────────────────────

impl SurveyStore for SqliteStore {
  type Error = crate::Error;

  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn ingest(&self, submission: Submission) -> Result<IngestReceipt> {
    // The closure returns our own Result nested inside the connection's, so
    // domain errors survive the hop across the connection thread intact.
    self
      .conn
      .call(move |conn| Ok(ingest::run(conn, &submission)))
      .await?
  }

  // ── Reference geography ───────────────────────────────────────────────────

  async fn add_water_body(&self, name: String) -> Result<WaterBody> {
    let stored = name.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO water_body (name) VALUES (?1)",
          rusqlite::params![name],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(WaterBody { id, name: stored })
  }

  async fn add_site(&self, site: NewSite) -> Result<Site> {
    let stored = site.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO site (name, abbreviation, water_body_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![site.name, site.abbreviation, site.water_body_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Site {
      id,
      name:          stored.name,
      abbreviation:  stored.abbreviation,
      water_body_id: stored.water_body_id,
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_survey(
    &self,
    record_metadata_id: i64,
  ) -> Result<Option<SurveyView>> {
    let bundle = self
      .conn
      .call(move |conn| Ok(read_survey_bundle(conn, record_metadata_id)?))
      .await?;

    bundle.map(RawSurveyBundle::into_view).transpose()
  }

  async fn list_surveys(&self) -> Result<Vec<SurveySummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT rm.id, riv.id, riv.site_id, rm.arrival_time
           FROM record_metadata rm
           JOIN river_metadata riv ON riv.record_metadata_id = rm.id
           ORDER BY rm.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSummary {
              record_metadata_id: row.get(0)?,
              river_metadata_id:  row.get(1)?,
              site_id:            row.get(2)?,
              arrival_time:       row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn get_device(&self, id: i64) -> Result<Option<Device>> {
    let device = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, make, model, owner FROM device WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(Device {
                  id:    row.get(0)?,
                  make:  row.get(1)?,
                  model: row.get(2)?,
                  owner: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(device)
  }

  async fn get_persona(&self, id: i64) -> Result<Option<Persona>> {
    let persona = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, first_name, last_name, id_document, affiliation
               FROM persona WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(Persona {
                  id:          row.get(0)?,
                  first_name:  row.get(1)?,
                  last_name:   row.get(2)?,
                  id_document: row.get(3)?,
                  affiliation: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(persona)
  }

  async fn get_profile(&self, id: i64) -> Result<Option<Profile>> {
    let profile = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, site_id, code, mix_criteria, mix_notes,
                      stratification_criteria, stratification_notes
               FROM profile WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(Profile {
                  id:                      row.get(0)?,
                  site_id:                 row.get(1)?,
                  code:                    row.get(2)?,
                  mix_criteria:            row.get(3)?,
                  mix_notes:               row.get(4)?,
                  stratification_criteria: row.get(5)?,
                  stratification_notes:    row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(profile)
  }

  async fn find_vegetation(
    &self,
    context: VegetationContext,
    name: &str,
  ) -> Result<Option<Vegetation>> {
    let table = match context {
      VegetationContext::Shore => "shore_vegetation",
      VegetationContext::Water => "water_vegetation",
    };
    let sql = format!("SELECT id, name FROM {table} WHERE name = ?1");
    let name = name.to_owned();

    let vegetation = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![name], |row| {
              Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .optional()?,
        )
      })
      .await?;

    Ok(vegetation.map(|(id, name)| Vegetation { id, name, context }))
  }
}
