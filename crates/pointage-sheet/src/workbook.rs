//! Excel workbooks: the first worksheet is read through the same header
//! mapping as CSV, and exports are written as a single named worksheet.

use std::io::Cursor;

use bytes::Bytes;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use pointage_core::import::ImportRow;
use rust_xlsxwriter::{Format, Workbook};

use crate::{
  error::{Error, Result},
  parse::{Record, rows_from_records},
  serialize::Cell,
};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xd0, 0xcf, 0x11, 0xe0];

/// `.xlsx`/`.ods` are zip containers, legacy `.xls` is an OLE compound file.
pub(crate) fn is_workbook(data: &[u8]) -> bool {
  data.starts_with(ZIP_MAGIC) || data.starts_with(OLE_MAGIC)
}

/// Render a cell the way it reads on screen. Whole floats lose their
/// fractional part so numeric phone cells stay digit-only.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    Data::Int(n) => n.to_string(),
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
      (*f as i64).to_string()
    }
    other => other.to_string(),
  }
}

pub(crate) fn read_workbook(data: &[u8]) -> Result<Vec<ImportRow>> {
  let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
  let range = workbook
    .worksheet_range_at(0)
    .ok_or(Error::MissingHeader)??;

  // Rows before the first used one are not part of the range.
  let first_row = range.start().map_or(0, |(row, _)| row as usize);
  let records = range.rows().enumerate().map(|(i, cells)| Record {
    line:  first_row + i + 1,
    cells: cells.iter().map(cell_text).collect(),
  });
  rows_from_records(records)
}

pub(crate) fn write_workbook<I>(
  sheet_name: &str,
  headers: &[&str],
  records: I,
) -> Result<Bytes>
where
  I: IntoIterator<Item = Vec<Cell>>,
{
  let mut workbook = Workbook::new();
  let header_format = Format::new().set_bold();

  let worksheet = workbook.add_worksheet();
  worksheet.set_name(sheet_name)?;
  for (col, header) in (0u16..).zip(headers) {
    worksheet.write_string_with_format(0, col, *header, &header_format)?;
  }
  for (row, record) in (1u32..).zip(records) {
    for (col, cell) in (0u16..).zip(record) {
      match cell {
        Cell::Int(n) => worksheet.write_number(row, col, n as f64)?,
        Cell::Text(s) => worksheet.write_string(row, col, s)?,
      };
    }
  }

  Ok(Bytes::from(workbook.save_to_buffer()?))
}
