//! The presence toggle.
//!
//! Every tap on the kiosk appends exactly one event whose kind is the
//! opposite of the member's latest one. The decision lives in
//! [`next_event`]; backends call it from inside the same atomic section that
//! reads the latest event and appends the new one (see
//! [`AttendanceStore::toggle_presence`]), so two concurrent taps for one
//! member can never both observe the same "last event".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  EventId, MemberId, Result,
  event::{Event, EventKind, NewEvent},
  member::{Member, MemberIdentity},
  store::AttendanceStore,
};

/// Decide the event that follows `last` for `member_id`.
///
/// The reason is kept only on entries, trimmed, and dropped when blank.
pub fn next_event(
  member_id: MemberId,
  last: Option<EventKind>,
  reason: Option<String>,
) -> NewEvent {
  let kind = EventKind::following(last);
  let reason = match kind {
    EventKind::Entry => reason
      .map(|r| r.trim().to_owned())
      .filter(|r| !r.is_empty()),
    EventKind::Exit => None,
  };
  NewEvent { member_id, kind, reason }
}

/// Outcome of a successful toggle, shaped for the kiosk display.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceReceipt {
  pub success:     bool,
  pub member:      MemberIdentity,
  #[serde(rename = "type")]
  pub event_type:  EventKind,
  pub message:     String,
  pub event_id:    EventId,
  pub recorded_at: DateTime<Utc>,
}

impl PresenceReceipt {
  pub fn new(member: &Member, event: &Event) -> Self {
    Self {
      success:     true,
      member:      member.identity(),
      event_type:  event.kind,
      message:     format!(
        "{} recorded for {} {}",
        event.kind.as_ref().to_uppercase(),
        member.surname,
        member.name
      ),
      event_id:    event.event_id,
      recorded_at: event.recorded_at,
    }
  }
}

/// Records presence events on top of any [`AttendanceStore`].
pub struct PresenceResolver<S> {
  store: Arc<S>,
}

impl<S> Clone for PresenceResolver<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: AttendanceStore> PresenceResolver<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Append the next event for `member_id`.
  ///
  /// Fails with [`crate::Error::MemberNotFound`] for unknown or inactive
  /// members, before anything is written.
  pub async fn record(
    &self,
    member_id: MemberId,
    reason: Option<String>,
  ) -> Result<PresenceReceipt> {
    let (member, event) = self
      .store
      .toggle_presence(member_id, reason)
      .await
      .map_err(|e| -> crate::Error { e.into() })?;

    tracing::info!(
      member_id,
      event_id = event.event_id,
      kind = %event.kind,
      "presence event recorded"
    );

    Ok(PresenceReceipt::new(&member, &event))
  }
}
