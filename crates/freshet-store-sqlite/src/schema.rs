//! SQL schema for the Freshet SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.
//!
//! Natural keys of shared entities are carried by UNIQUE constraints so that
//! two racing submissions can never duplicate a device, persona, profile, or
//! vegetation row; the resolver relies on this.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference geography, managed outside the ingestion transaction.
CREATE TABLE IF NOT EXISTS water_body (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS site (
    id            INTEGER PRIMARY KEY,
    name          TEXT NOT NULL,
    abbreviation  TEXT,
    water_body_id INTEGER NOT NULL REFERENCES water_body(id)
);

-- Per-submission rows. Created inside the ingestion transaction, never
-- updated or deleted afterwards.
CREATE TABLE IF NOT EXISTS weather (
    id            INTEGER PRIMARY KEY,
    air_temp      REAL NOT NULL,
    cloudiness    TEXT NOT NULL,
    wind_status   TEXT NOT NULL,
    wind_velocity REAL NOT NULL,
    precipitation TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS visit (
    id                INTEGER PRIMARY KEY,
    number            INTEGER NOT NULL,
    date              TEXT NOT NULL,      -- ISO 8601 UTC
    season            TEXT,
    hydrological_year TEXT
);

CREATE TABLE IF NOT EXISTS gauge_reading (
    id            INTEGER PRIMARY KEY,
    gauge         REAL NOT NULL,
    area          REAL NOT NULL,
    average_speed REAL NOT NULL,
    width         REAL NOT NULL,
    depth_factor  REAL NOT NULL,
    observations  TEXT
);

CREATE TABLE IF NOT EXISTS record_metadata (
    id             INTEGER PRIMARY KEY,
    visit_id       INTEGER NOT NULL REFERENCES visit(id),
    weather_id     INTEGER NOT NULL REFERENCES weather(id),
    arrival_time   TEXT NOT NULL,
    departure_time TEXT NOT NULL,
    latitude       REAL NOT NULL,
    longitude      REAL NOT NULL,
    observations   TEXT
);

-- 1:1 with record_metadata; the UNIQUE constraint carries the invariant.
CREATE TABLE IF NOT EXISTS river_metadata (
    id                 INTEGER PRIMARY KEY,
    record_metadata_id INTEGER NOT NULL UNIQUE REFERENCES record_metadata(id),
    river_status       TEXT NOT NULL,
    gauge_reading_id   INTEGER NOT NULL REFERENCES gauge_reading(id),
    water_color        TEXT NOT NULL,
    site_id            INTEGER NOT NULL REFERENCES site(id)
);

CREATE TABLE IF NOT EXISTS record (
    id                 INTEGER PRIMARY KEY,
    depth              REAL NOT NULL,
    record_metadata_id INTEGER NOT NULL REFERENCES record_metadata(id)
);

CREATE TABLE IF NOT EXISTS sample (
    id           INTEGER PRIMARY KEY,
    number       INTEGER NOT NULL,
    time         TEXT NOT NULL,           -- HH:MM:SS
    record_id    INTEGER NOT NULL REFERENCES record(id),
    profile_id   INTEGER NOT NULL REFERENCES profile(id),
    observations TEXT,
    laboratory   TEXT
);

-- Shared entities: at most one row per natural key, first write wins.
CREATE TABLE IF NOT EXISTS device (
    id    INTEGER PRIMARY KEY,            -- caller-chosen
    make  TEXT NOT NULL,
    model TEXT NOT NULL,
    owner TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS persona (
    id          INTEGER PRIMARY KEY,      -- caller-chosen
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    id_document TEXT NOT NULL,
    affiliation TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profile (
    id                      INTEGER PRIMARY KEY,  -- caller-chosen
    site_id                 INTEGER NOT NULL REFERENCES site(id),
    code                    TEXT NOT NULL UNIQUE,
    mix_criteria            TEXT,
    mix_notes               TEXT,
    stratification_criteria TEXT,
    stratification_notes    TEXT
);

CREATE TABLE IF NOT EXISTS shore_vegetation (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS water_vegetation (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- Junction rows, fresh per submission.
CREATE TABLE IF NOT EXISTS device_record_metadata (
    id                 INTEGER PRIMARY KEY,
    device_id          INTEGER NOT NULL REFERENCES device(id),
    record_metadata_id INTEGER NOT NULL REFERENCES record_metadata(id),
    category           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS persona_record_metadata (
    id                 INTEGER PRIMARY KEY,
    persona_id         INTEGER NOT NULL REFERENCES persona(id),
    record_metadata_id INTEGER NOT NULL REFERENCES record_metadata(id),
    role               TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS river_shore_vegetation (
    id                  INTEGER PRIMARY KEY,
    river_metadata_id   INTEGER NOT NULL REFERENCES river_metadata(id),
    shore_vegetation_id INTEGER NOT NULL REFERENCES shore_vegetation(id)
);

CREATE TABLE IF NOT EXISTS river_water_vegetation (
    id                  INTEGER PRIMARY KEY,
    river_metadata_id   INTEGER NOT NULL REFERENCES river_metadata(id),
    water_vegetation_id INTEGER NOT NULL REFERENCES water_vegetation(id)
);

CREATE INDEX IF NOT EXISTS record_metadata_idx ON record(record_metadata_id);
CREATE INDEX IF NOT EXISTS sample_record_idx   ON sample(record_id);
CREATE INDEX IF NOT EXISTS device_rm_idx       ON device_record_metadata(record_metadata_id);
CREATE INDEX IF NOT EXISTS persona_rm_idx      ON persona_record_metadata(record_metadata_id);
CREATE INDEX IF NOT EXISTS shore_veg_rm_idx    ON river_shore_vegetation(river_metadata_id);
CREATE INDEX IF NOT EXISTS water_veg_rm_idx    ON river_water_vegetation(river_metadata_id);

PRAGMA user_version = 1;
";
