//! Member sheet reader.
//!
//! Pipeline:
//!   raw bytes
//!     └─ CSV: strip BOM, detect delimiter, split_records()
//!        workbook: first worksheet (see `workbook.rs`)
//!          └─ Record { line, cells } per physical record
//!               └─ column_for() maps each header to a member field
//!                    └─ one ImportRow per non-blank data record

use pointage_core::{import::ImportRow, member::NewMember};

use crate::error::{Error, Result};

// ─── Columns ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
  Name,
  Surname,
  Phone,
  Gender,
  Affiliation,
}

/// Lower-case, accent-fold and collapse whitespace so that `Téléphone`,
/// `TELEPHONE` and ` telephone ` all compare equal.
pub(crate) fn fold_header(raw: &str) -> String {
  let folded: String = raw
    .trim()
    .chars()
    .flat_map(char::to_lowercase)
    .map(|c| match c {
      'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
      'é' | 'è' | 'ê' | 'ë' => 'e',
      'î' | 'ï' | 'í' | 'ì' => 'i',
      'ô' | 'ö' | 'ó' | 'ò' | 'õ' => 'o',
      'ù' | 'û' | 'ü' | 'ú' => 'u',
      'ç' => 'c',
      'ñ' => 'n',
      '_' | '-' => ' ',
      other => other,
    })
    .collect();
  folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The synonym table. Expects a header already passed through
/// [`fold_header`].
pub(crate) fn column_for(folded: &str) -> Option<Column> {
  match folded {
    "nom" | "name" | "last name" | "lastname" | "nom de famille" => {
      Some(Column::Name)
    }
    "prenom" | "surname" | "first name" | "firstname" | "given name" => {
      Some(Column::Surname)
    }
    "telephone" | "tel" | "phone" | "numero" | "portable" | "mobile" => {
      Some(Column::Phone)
    }
    "sexe" | "genre" | "gender" => Some(Column::Gender),
    "lien" | "affiliation" | "categorie" | "category" => {
      Some(Column::Affiliation)
    }
    _ => None,
  }
}

// ─── Low-level helpers ───────────────────────────────────────────────────────

const DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Pick the delimiter that occurs most often outside quotes in the header.
/// Ties go to the comma.
fn detect_delimiter(header: &str) -> char {
  let mut counts = [0usize; DELIMITERS.len()];
  let mut in_quotes = false;
  for c in header.chars() {
    if c == '"' {
      in_quotes = !in_quotes;
    } else if !in_quotes
      && let Some(i) = DELIMITERS.iter().position(|d| *d == c)
    {
      counts[i] += 1;
    }
  }

  let mut best = 0;
  for i in 1..DELIMITERS.len() {
    if counts[i] > counts[best] {
      best = i;
    }
  }
  DELIMITERS[best]
}

/// One record of a sheet and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
  pub line:  usize,
  pub cells: Vec<String>,
}

impl Record {
  fn is_blank(&self) -> bool { self.cells.iter().all(|c| c.trim().is_empty()) }
}

/// Split the whole text into records, honouring double quotes and `""`
/// escapes. A quoted cell may span several lines; `line` is where its
/// record starts.
fn split_records(text: &str, delimiter: char) -> Vec<Record> {
  let mut records = Vec::new();
  let mut cells = Vec::new();
  let mut current = String::new();
  let mut in_quotes = false;
  let mut line = 1;
  let mut start = 1;
  let mut chars = text.chars().peekable();

  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' if chars.peek() == Some(&'"') => {
          current.push('"');
          chars.next();
        }
        '"' => in_quotes = false,
        '\n' => {
          line += 1;
          current.push(c);
        }
        _ => current.push(c),
      }
      continue;
    }

    match c {
      '"' => in_quotes = true,
      '\r' if chars.peek() == Some(&'\n') => {}
      '\n' | '\r' => {
        cells.push(std::mem::take(&mut current));
        records.push(Record { line: start, cells: std::mem::take(&mut cells) });
        line += 1;
        start = line;
      }
      c if c == delimiter => cells.push(std::mem::take(&mut current)),
      _ => current.push(c),
    }
  }

  if !current.is_empty() || !cells.is_empty() {
    cells.push(current);
    records.push(Record { line: start, cells });
  }
  records
}

fn opt_cell(s: &str) -> Option<String> {
  let s = s.trim();
  if s.is_empty() { None } else { Some(s.to_owned()) }
}

// ─── Reader ──────────────────────────────────────────────────────────────────

/// Turn records into import rows. The first non-blank record is the header.
/// Unknown columns are ignored; missing required columns surface later as
/// per-row validation failures, so a bad header never aborts the import on
/// its own.
pub(crate) fn rows_from_records<I>(records: I) -> Result<Vec<ImportRow>>
where
  I: IntoIterator<Item = Record>,
{
  let mut records = records.into_iter().filter(|r| !r.is_blank());
  let header = records.next().ok_or(Error::MissingHeader)?;
  let columns: Vec<Option<Column>> = header
    .cells
    .iter()
    .map(|h| column_for(&fold_header(h)))
    .collect();

  let rows: Vec<ImportRow> = records
    .map(|record| {
      let mut member = NewMember::default();
      for (column, cell) in columns.iter().zip(record.cells) {
        let Some(column) = column else { continue };
        match column {
          Column::Name => member.name = cell,
          Column::Surname => member.surname = cell,
          Column::Phone => member.phone = cell,
          Column::Gender => member.gender = opt_cell(&cell),
          Column::Affiliation => member.affiliation = opt_cell(&cell),
        }
      }
      ImportRow { line: record.line, member }
    })
    .collect();

  if rows.is_empty() {
    return Err(Error::Empty);
  }
  Ok(rows)
}

/// Read a delimited-text member sheet.
pub(crate) fn read_csv(data: &[u8]) -> Result<Vec<ImportRow>> {
  let text = std::str::from_utf8(data)?;
  let text = text.strip_prefix('\u{feff}').unwrap_or(text);

  let header = text
    .lines()
    .find(|l| !l.trim().is_empty())
    .ok_or(Error::MissingHeader)?;
  rows_from_records(split_records(text, detect_delimiter(header)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
