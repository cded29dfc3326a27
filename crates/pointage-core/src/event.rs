//! Presence events ("mouvements").
//!
//! Events are strictly append-only. A member's presence is never stored; it is
//! recomputed from their most recent event every time it is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EventId, MemberId};

/// The two states of the presence toggle. There is no third state.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
  Entry,
  Exit,
}

impl EventKind {
  /// The kind that must follow `last` for the log to keep alternating.
  /// A member with no history always starts with an entry.
  pub fn following(last: Option<EventKind>) -> EventKind {
    match last {
      Some(EventKind::Entry) => EventKind::Exit,
      Some(EventKind::Exit) | None => EventKind::Entry,
    }
  }

  /// Whether a member whose latest event has this kind is on the premises.
  pub fn marks_present(self) -> bool { self == EventKind::Entry }
}

/// An immutable row of the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:    EventId,
  pub member_id:   MemberId,
  pub kind:        EventKind,
  /// Free text; only ever set on entries.
  pub reason:      Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub recorded_at: DateTime<Utc>,
}

/// An event ready to be appended. Built by
/// [`crate::presence::next_event`], which is the only place allowed to pick a
/// kind.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NewEvent {
  pub member_id: MemberId,
  pub kind:      EventKind,
  pub reason:    Option<String>,
}

/// An event joined with the identity of its member, for history listings and
/// exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
  pub event_id:    EventId,
  pub member_id:   MemberId,
  pub name:        String,
  pub surname:     String,
  pub phone:       String,
  pub kind:        EventKind,
  pub reason:      Option<String>,
  pub recorded_at: DateTime<Utc>,
}

/// A member whose latest event is an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentMember {
  pub member_id:   MemberId,
  pub name:        String,
  pub surname:     String,
  pub phone:       String,
  pub affiliation: String,
  pub entered_at:  DateTime<Utc>,
}
