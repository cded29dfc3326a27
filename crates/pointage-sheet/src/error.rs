//! Error types for the pointage-sheet codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sheet is not valid UTF-8: {0}")]
  InvalidEncoding(#[from] std::str::Utf8Error),

  #[error("unreadable workbook: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("sheet has no header row")]
  MissingHeader,

  #[error("sheet contains no data rows")]
  Empty,

  #[error("failed to write workbook: {0}")]
  Write(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
  /// Whether the error comes from producing an export rather than from the
  /// uploaded data.
  pub fn is_write(&self) -> bool { matches!(self, Error::Write(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
