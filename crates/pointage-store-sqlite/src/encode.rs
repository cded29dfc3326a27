//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings in UTC, so lexical order is
//! chronological order. Enums are stored as their lowercase names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use pointage_core::{
  AdminId, EventId, MemberId,
  admin::{Admin, AdminCredentials, AdminRole},
  event::{Event, EventKind, Movement, PresentMember},
  member::{Member, MemberStatus},
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownValue {
    column,
    value: s.to_owned(),
  })
}

/// Read a text column straight into an enum, for use inside connection
/// closures where only `rusqlite` errors can be raised.
pub fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  let text: String = row.get(idx)?;
  text.parse().map_err(|e| {
    rusqlite::Error::FromSqlConversionFailure(
      idx,
      rusqlite::types::Type::Text,
      Box::new(e),
    )
  })
}

/// Escape `%`, `_` and `\` so a user fragment matches literally inside
/// `LIKE ... ESCAPE '\'`.
pub fn like_contains(fragment: &str) -> String {
  let mut escaped = String::with_capacity(fragment.len() + 2);
  escaped.push('%');
  for c in fragment.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const MEMBER_COLUMNS: &str =
  "member_id, name, surname, phone, gender, affiliation, registered_at, status";

/// Raw values read directly from a `members` row.
pub struct RawMember {
  pub member_id:     MemberId,
  pub name:          String,
  pub surname:       String,
  pub phone:         String,
  pub gender:        String,
  pub affiliation:   String,
  pub registered_at: String,
  pub status:        String,
}

impl RawMember {
  /// Expects the columns in [`MEMBER_COLUMNS`] order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      member_id:     row.get(0)?,
      name:          row.get(1)?,
      surname:       row.get(2)?,
      phone:         row.get(3)?,
      gender:        row.get(4)?,
      affiliation:   row.get(5)?,
      registered_at: row.get(6)?,
      status:        row.get(7)?,
    })
  }

  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      member_id:     self.member_id,
      name:          self.name,
      surname:       self.surname,
      phone:         self.phone,
      gender:        self.gender,
      affiliation:   self.affiliation,
      registered_at: decode_dt(&self.registered_at)?,
      status:        decode_enum::<MemberStatus>("status", &self.status)?,
    })
  }
}

pub const EVENT_COLUMNS: &str = "event_id, member_id, kind, reason, recorded_at";

/// Raw values read directly from an `events` (or `latest_events`) row.
pub struct RawEvent {
  pub event_id:    EventId,
  pub member_id:   MemberId,
  pub kind:        String,
  pub reason:      Option<String>,
  pub recorded_at: String,
}

impl RawEvent {
  /// Expects the columns in [`EVENT_COLUMNS`] order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      member_id:   row.get(1)?,
      kind:        row.get(2)?,
      reason:      row.get(3)?,
      recorded_at: row.get(4)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:    self.event_id,
      member_id:   self.member_id,
      kind:        decode_enum::<EventKind>("kind", &self.kind)?,
      reason:      self.reason,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub const MOVEMENT_SELECT: &str = "
  SELECT e.event_id, e.member_id, m.name, m.surname, m.phone,
         e.kind, e.reason, e.recorded_at
  FROM events e
  JOIN members m ON m.member_id = e.member_id";

/// An `events` row joined with its member's identity.
pub struct RawMovement {
  pub event_id:    EventId,
  pub member_id:   MemberId,
  pub name:        String,
  pub surname:     String,
  pub phone:       String,
  pub kind:        String,
  pub reason:      Option<String>,
  pub recorded_at: String,
}

impl RawMovement {
  /// Expects the columns of [`MOVEMENT_SELECT`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      member_id:   row.get(1)?,
      name:        row.get(2)?,
      surname:     row.get(3)?,
      phone:       row.get(4)?,
      kind:        row.get(5)?,
      reason:      row.get(6)?,
      recorded_at: row.get(7)?,
    })
  }

  pub fn into_movement(self) -> Result<Movement> {
    Ok(Movement {
      event_id:    self.event_id,
      member_id:   self.member_id,
      name:        self.name,
      surname:     self.surname,
      phone:       self.phone,
      kind:        decode_enum::<EventKind>("kind", &self.kind)?,
      reason:      self.reason,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub struct RawPresent {
  pub member_id:   MemberId,
  pub name:        String,
  pub surname:     String,
  pub phone:       String,
  pub affiliation: String,
  pub entered_at:  String,
}

impl RawPresent {
  pub fn into_present(self) -> Result<PresentMember> {
    Ok(PresentMember {
      member_id:   self.member_id,
      name:        self.name,
      surname:     self.surname,
      phone:       self.phone,
      affiliation: self.affiliation,
      entered_at:  decode_dt(&self.entered_at)?,
    })
  }
}

pub const ADMIN_COLUMNS: &str =
  "admin_id, username, role, created_at, password_hash";

/// Raw values read directly from an `admins` row.
pub struct RawAdmin {
  pub admin_id:      AdminId,
  pub username:      String,
  pub role:          String,
  pub created_at:    String,
  pub password_hash: String,
}

impl RawAdmin {
  /// Expects the columns in [`ADMIN_COLUMNS`] order.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      admin_id:      row.get(0)?,
      username:      row.get(1)?,
      role:          row.get(2)?,
      created_at:    row.get(3)?,
      password_hash: row.get(4)?,
    })
  }

  pub fn into_credentials(self) -> Result<AdminCredentials> {
    Ok(AdminCredentials {
      admin:         Admin {
        admin_id:   self.admin_id,
        username:   self.username,
        role:       decode_enum::<AdminRole>("role", &self.role)?,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }

  pub fn into_admin(self) -> Result<Admin> {
    Ok(self.into_credentials()?.admin)
  }
}
