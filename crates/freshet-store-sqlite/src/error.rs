//! Error type for `freshet-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] freshet_core::Error),

  #[error("database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("connection error: {0}")]
  Connection(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The submission names a site the store does not know.
  #[error("site {0} does not exist")]
  UnknownSite(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
