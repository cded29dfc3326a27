//! Error type for `pointage-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] pointage_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unexpected value {value:?} in column {column}")]
  UnknownValue { column: &'static str, value: String },
}

/// Domain errors keep their meaning; everything else is a storage failure.
impl From<Error> for pointage_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => pointage_core::Error::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
