//! Bulk member creation from spreadsheet rows.
//!
//! Rows are inserted one at a time. A failing row is recorded and skipped;
//! it never aborts the batch and nothing is rolled back.

use serde::Serialize;

use crate::{member::NewMember, store::AttendanceStore};

/// At most this many row errors are echoed back to the caller.
pub const MAX_REPORTED_ERRORS: usize = 10;

/// One data row of an uploaded sheet.
#[derive(Debug, Clone)]
pub struct ImportRow {
  /// 1-based line (or worksheet row) the record starts on in the source
  /// sheet.
  pub line:   usize,
  pub member: NewMember,
}

impl ImportRow {
  /// Build a row from its zero-based position among the data rows of a
  /// sheet whose header sits on line 1.
  pub fn at_index(index: usize, member: NewMember) -> Self {
    Self { line: index + 2, member }
  }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
  pub success:  bool,
  pub message:  String,
  #[serde(rename = "importes")]
  pub imported: usize,
  #[serde(rename = "erreurs")]
  pub failed:   usize,
  /// The first [`MAX_REPORTED_ERRORS`] row errors.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub errors:   Vec<String>,
}

impl ImportReport {
  fn record_failure(&mut self, line: usize, reason: impl std::fmt::Display) {
    self.failed += 1;
    if self.errors.len() < MAX_REPORTED_ERRORS {
      self.errors.push(format!("row {line}: {reason}"));
    }
  }
}

/// Validate and insert every row, collecting per-row outcomes.
pub async fn bulk_create<S: AttendanceStore>(
  store: &S,
  rows: Vec<ImportRow>,
) -> ImportReport {
  let mut report = ImportReport::default();

  for row in rows {
    let valid = match row.member.validate() {
      Ok(v) => v,
      Err(e) => {
        report.record_failure(row.line, e);
        continue;
      }
    };

    match store.add_member(valid).await {
      Ok(_) => report.imported += 1,
      Err(e) => {
        let e: crate::Error = e.into();
        if matches!(e, crate::Error::Storage(_)) {
          tracing::warn!(line = row.line, error = %e, "import row failed");
        }
        report.record_failure(row.line, e);
      }
    }
  }

  report.success = true;
  report.message = format!(
    "import finished: {} added, {} failed",
    report.imported, report.failed
  );
  tracing::info!(
    imported = report.imported,
    failed = report.failed,
    "bulk import finished"
  );
  report
}
