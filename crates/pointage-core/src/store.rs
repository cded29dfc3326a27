//! The `AttendanceStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `pointage-store-sqlite`). Higher layers (`pointage-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  AdminId, MemberId,
  admin::{Admin, AdminCredentials, AdminRole},
  event::{Event, Movement, PresentMember},
  member::{Member, ValidMember},
  report::{DailyCount, LabelCount, MemberVisits, Summary},
};

/// Rows removed by [`AttendanceStore::reset_members`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResetCounts {
  pub members: u64,
  pub events:  u64,
}

/// Abstraction over a Pointage storage backend.
///
/// Events are append-only and can only be created through
/// [`toggle_presence`](Self::toggle_presence). Backend errors must convert
/// into [`crate::Error`], keeping domain variants (not found, duplicates)
/// distinct from storage failures.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AttendanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Member directory ──────────────────────────────────────────────────

  /// Persist a validated member.
  ///
  /// Fails with [`crate::Error::DuplicatePerson`] when an *active* member
  /// already has the same identity key. Phone collisions are accepted.
  fn add_member(
    &self,
    member: ValidMember,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  /// Retrieve a member by id regardless of status. Returns `None` if absent.
  fn get_member(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  /// Active members whose phone contains `fragment`. Fragments shorter than
  /// [`crate::member::MIN_SEARCH_FRAGMENT`] yield an empty list.
  fn search_by_phone(
    &self,
    fragment: String,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Members ordered by name then surname; inactive ones only on request.
  fn list_members(
    &self,
    include_inactive: bool,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Soft-delete a member. Idempotent; unknown ids fail with
  /// [`crate::Error::MemberNotFound`].
  fn deactivate_member(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  // ── Event log ─────────────────────────────────────────────────────────

  /// Atomically read the latest event of an active member, decide the next
  /// one with [`crate::presence::next_event`], and append it.
  ///
  /// Concurrent calls for the same member are serialised; nothing is written
  /// when the member is unknown or inactive.
  fn toggle_presence(
    &self,
    member_id: MemberId,
    reason: Option<String>,
  ) -> impl Future<Output = Result<(Member, Event), Self::Error>> + Send + '_;

  /// The member's most recent event, if any.
  fn latest_event(
    &self,
    member_id: MemberId,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Active members whose latest event is an entry, most recent first.
  fn list_present(
    &self,
  ) -> impl Future<Output = Result<Vec<PresentMember>, Self::Error>> + Send + '_;

  /// The `limit` most recent events joined with member identity.
  fn history(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Movement>, Self::Error>> + Send + '_;

  /// Every event joined with member identity, newest first.
  fn all_movements(
    &self,
  ) -> impl Future<Output = Result<Vec<Movement>, Self::Error>> + Send + '_;

  // ── Admins ────────────────────────────────────────────────────────────

  /// Create the protected superadmin if no account holds its id. Never
  /// overwrites an existing account. Returns `true` when a row was created,
  /// and `DuplicateUsername` when another account already uses the name.
  fn bootstrap_superadmin(
    &self,
    username: String,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fails with [`crate::Error::DuplicateUsername`] on collision.
  fn add_admin(
    &self,
    username: String,
    password_hash: String,
    role: AdminRole,
  ) -> impl Future<Output = Result<Admin, Self::Error>> + Send + '_;

  fn find_admin_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<AdminCredentials>, Self::Error>> + Send + '_;

  fn get_admin_credentials(
    &self,
    id: AdminId,
  ) -> impl Future<Output = Result<Option<AdminCredentials>, Self::Error>> + Send + '_;

  fn list_admins(
    &self,
  ) -> impl Future<Output = Result<Vec<Admin>, Self::Error>> + Send + '_;

  /// Replace the hash only if it still equals `expected_hash`. Returns
  /// `false` when the stored hash changed in the meantime.
  fn replace_password_hash(
    &self,
    id: AdminId,
    expected_hash: String,
    new_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fails with [`crate::Error::ProtectedAdmin`] for
  /// [`crate::admin::PROTECTED_ADMIN_ID`] and
  /// [`crate::Error::AdminNotFound`] for unknown ids.
  fn delete_admin(
    &self,
    id: AdminId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn summary(
    &self,
  ) -> impl Future<Output = Result<Summary, Self::Error>> + Send + '_;

  /// Active members grouped by gender.
  fn count_by_gender(
    &self,
  ) -> impl Future<Output = Result<Vec<LabelCount>, Self::Error>> + Send + '_;

  /// Active members grouped by affiliation.
  fn count_by_affiliation(
    &self,
  ) -> impl Future<Output = Result<Vec<LabelCount>, Self::Error>> + Send + '_;

  /// Members with the most entry events.
  fn top_members(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<MemberVisits>, Self::Error>> + Send + '_;

  /// Entry events per UTC day over the trailing `days` days, today included.
  fn daily_entries(
    &self,
    days: u32,
  ) -> impl Future<Output = Result<Vec<DailyCount>, Self::Error>> + Send + '_;

  /// Entry reasons split into motifs and counted.
  fn reason_tally(
    &self,
  ) -> impl Future<Output = Result<Vec<LabelCount>, Self::Error>> + Send + '_;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Delete every member and event. Admin accounts are untouched.
  fn reset_members(
    &self,
  ) -> impl Future<Output = Result<ResetCounts, Self::Error>> + Send + '_;
}
