//! Spreadsheet codec for Pointage.
//!
//! Reads member sheets from Excel workbooks (first worksheet) or delimited
//! text, and writes member and movement exports in either format. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use pointage_sheet::{SheetFormat, read_members, write_members};
//!
//! let sheet = "Nom;Prénom;Téléphone\nDupont;Jean;0601020304\n";
//! let rows = read_members(sheet.as_bytes()).unwrap();
//! println!("{} rows, first on line {}", rows.len(), rows[0].line);
//!
//! let xlsx = write_members(&[], SheetFormat::Xlsx).unwrap();
//! ```

pub mod error;
mod parse;
mod serialize;
mod workbook;

use bytes::Bytes;
use pointage_core::{event::Movement, import::ImportRow, member::Member};
use serde::Deserialize;

pub use error::{Error, Result};
pub use serialize::{MEMBER_HEADERS, MOVEMENT_HEADERS};

use crate::serialize::{member_record, movement_record, write_csv};

/// Worksheet names used in exported workbooks.
pub const MEMBER_SHEET: &str = "Membres";
pub const MOVEMENT_SHEET: &str = "Mouvements";

/// Output format of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
  #[default]
  Xlsx,
  Csv,
}

impl SheetFormat {
  pub fn content_type(self) -> &'static str {
    match self {
      SheetFormat::Xlsx => {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
      }
      SheetFormat::Csv => "text/csv; charset=utf-8",
    }
  }

  pub fn extension(self) -> &'static str {
    match self {
      SheetFormat::Xlsx => "xlsx",
      SheetFormat::Csv => "csv",
    }
  }
}

/// Read a member sheet. Workbooks are recognised by their container
/// signature; anything else is read as delimited text.
pub fn read_members(data: &[u8]) -> Result<Vec<ImportRow>> {
  if workbook::is_workbook(data) {
    workbook::read_workbook(data)
  } else {
    parse::read_csv(data)
  }
}

pub fn write_members(members: &[Member], format: SheetFormat) -> Result<Bytes> {
  let records = members.iter().map(member_record);
  match format {
    SheetFormat::Xlsx => {
      workbook::write_workbook(MEMBER_SHEET, &MEMBER_HEADERS, records)
    }
    SheetFormat::Csv => Ok(write_csv(&MEMBER_HEADERS, records)),
  }
}

pub fn write_movements(
  movements: &[Movement],
  format: SheetFormat,
) -> Result<Bytes> {
  let records = movements.iter().map(movement_record);
  match format {
    SheetFormat::Xlsx => {
      workbook::write_workbook(MOVEMENT_SHEET, &MOVEMENT_HEADERS, records)
    }
    SheetFormat::Csv => Ok(write_csv(&MOVEMENT_HEADERS, records)),
  }
}
