//! Export records and the CSV writer.
//!
//! CSV output is UTF-8 with a leading BOM and CRLF line endings, which
//! spreadsheet applications open without an import dialog. Member headers
//! use the same names the reader recognises, so an export can be re-imported
//! in either format.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, SecondsFormat, Utc};
use pointage_core::{event::Movement, member::Member};

const BOM: &str = "\u{feff}";
const DELIMITER: char = ',';

pub const MEMBER_HEADERS: [&str; 8] = [
  "id",
  "nom",
  "prenom",
  "telephone",
  "sexe",
  "lien",
  "date_inscription",
  "statut",
];

pub const MOVEMENT_HEADERS: [&str; 7] =
  ["id", "nom", "prenom", "telephone", "type", "motif", "date_heure"];

// ─── Records ─────────────────────────────────────────────────────────────────

/// One exported cell. Ids stay numeric in workbooks.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
  Int(i64),
  Text(String),
}

impl Cell {
  fn text(&self) -> std::borrow::Cow<'_, str> {
    match self {
      Cell::Int(n) => n.to_string().into(),
      Cell::Text(s) => s.as_str().into(),
    }
  }
}

fn format_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn member_record(m: &Member) -> Vec<Cell> {
  vec![
    Cell::Int(m.member_id),
    Cell::Text(m.name.clone()),
    Cell::Text(m.surname.clone()),
    Cell::Text(m.phone.clone()),
    Cell::Text(m.gender.clone()),
    Cell::Text(m.affiliation.clone()),
    Cell::Text(format_dt(m.registered_at)),
    Cell::Text(m.status.as_ref().to_owned()),
  ]
}

pub(crate) fn movement_record(mv: &Movement) -> Vec<Cell> {
  vec![
    Cell::Int(mv.event_id),
    Cell::Text(mv.name.clone()),
    Cell::Text(mv.surname.clone()),
    Cell::Text(mv.phone.clone()),
    Cell::Text(mv.kind.as_ref().to_owned()),
    Cell::Text(mv.reason.clone().unwrap_or_default()),
    Cell::Text(format_dt(mv.recorded_at)),
  ]
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

/// Quote a cell when it contains the delimiter, a quote, or a line break.
fn escape_cell(value: &str) -> String {
  if value.contains([DELIMITER, '"', '\n', '\r']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_owned()
  }
}

struct CsvWriter {
  buf: BytesMut,
}

impl CsvWriter {
  fn new(headers: &[&str]) -> Self {
    let mut writer = Self { buf: BytesMut::new() };
    writer.buf.put_slice(BOM.as_bytes());
    writer.record(headers.iter().copied());
    writer
  }

  fn record<'a>(&mut self, cells: impl IntoIterator<Item = &'a str>) {
    for (i, cell) in cells.into_iter().enumerate() {
      if i > 0 {
        self.buf.put_u8(DELIMITER as u8);
      }
      self.buf.put_slice(escape_cell(cell).as_bytes());
    }
    self.buf.put_slice(b"\r\n");
  }

  fn finish(self) -> Bytes { self.buf.freeze() }
}

pub(crate) fn write_csv<I>(headers: &[&str], records: I) -> Bytes
where
  I: IntoIterator<Item = Vec<Cell>>,
{
  let mut writer = CsvWriter::new(headers);
  for record in records {
    let texts: Vec<_> = record.iter().map(Cell::text).collect();
    writer.record(texts.iter().map(|t| &**t));
  }
  writer.finish()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use pointage_core::{event::EventKind, member::MemberStatus};

  use super::*;

  fn member(id: i64, name: &str) -> Member {
    Member {
      member_id:     id,
      name:          name.into(),
      surname:       "Jean".into(),
      phone:         "0601020304".into(),
      gender:        "Non spécifié".into(),
      affiliation:   "Membre".into(),
      registered_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
      status:        MemberStatus::Active,
    }
  }

  fn text(bytes: &Bytes) -> &str { std::str::from_utf8(bytes).unwrap() }

  #[test]
  fn cells_with_delimiters_are_quoted() {
    assert_eq!(escape_cell("plain"), "plain");
    assert_eq!(escape_cell("a,b"), "\"a,b\"");
    assert_eq!(escape_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_cell("two\nlines"), "\"two\nlines\"");
  }

  #[test]
  fn members_sheet_layout() {
    let out = write_csv(
      &MEMBER_HEADERS,
      [member(1, "Dupont"), member(2, "Le Gall, Jr")].iter().map(member_record),
    );
    let body = text(&out);

    assert!(body.starts_with('\u{feff}'));
    let lines: Vec<&str> = body.trim_start_matches('\u{feff}').split("\r\n").collect();
    assert_eq!(lines[0], MEMBER_HEADERS.join(","));
    assert_eq!(
      lines[1],
      "1,Dupont,Jean,0601020304,Non spécifié,Membre,2024-06-01T09:30:00Z,active"
    );
    assert!(lines[2].starts_with("2,\"Le Gall, Jr\",Jean"));
    assert_eq!(lines[3], "");
  }

  #[test]
  fn movements_sheet_layout() {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
    let mv = |event_id, kind, reason: Option<&str>| Movement {
      event_id,
      member_id: 1,
      name: "Dupont".into(),
      surname: "Jean".into(),
      phone: "0601020304".into(),
      kind,
      reason: reason.map(str::to_owned),
      recorded_at: at,
    };

    let out = write_csv(
      &MOVEMENT_HEADERS,
      [mv(2, EventKind::Exit, None), mv(1, EventKind::Entry, Some("Lecture, Wifi"))]
        .iter()
        .map(movement_record),
    );
    let body = text(&out).trim_start_matches('\u{feff}');
    let lines: Vec<&str> = body.split("\r\n").collect();

    assert_eq!(lines[0], "id,nom,prenom,telephone,type,motif,date_heure");
    assert_eq!(lines[1], "2,Dupont,Jean,0601020304,exit,,2024-06-01T10:00:00Z");
    assert_eq!(
      lines[2],
      "1,Dupont,Jean,0601020304,entry,\"Lecture, Wifi\",2024-06-01T10:00:00Z"
    );
  }

  #[test]
  fn empty_export_is_header_only() {
    let out = write_csv(&MEMBER_HEADERS, std::iter::empty());
    assert_eq!(
      text(&out).trim_start_matches('\u{feff}'),
      format!("{}\r\n", MEMBER_HEADERS.join(","))
    );
  }
}
