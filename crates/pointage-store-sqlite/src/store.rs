//! [`SqliteStore`], the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use pointage_core::{
  AdminId, MemberId,
  admin::{Admin, AdminCredentials, AdminRole, PROTECTED_ADMIN_ID},
  event::{Event, EventKind, Movement, PresentMember},
  member::{Member, MemberStatus, ValidMember, is_searchable_fragment},
  presence::next_event,
  report::{
    DailyCount, LabelCount, MAX_DAILY_WINDOW, MemberVisits, Summary,
    daily_series, merge_counts, tally_reasons,
  },
  store::{AttendanceStore, ResetCounts},
};

use crate::{
  Error, Result,
  encode::{
    ADMIN_COLUMNS, EVENT_COLUMNS, MEMBER_COLUMNS, MOVEMENT_SELECT, RawAdmin,
    RawEvent, RawMember, RawMovement, RawPresent, encode_dt, enum_column,
    like_contains,
  },
  schema::SCHEMA,
};

/// Upper bound for `top_members`.
const MAX_TOP_MEMBERS: u32 = 100;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An attendance store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the connection's own thread, one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of an insert guarded by a uniqueness check done in the same
/// transaction.
enum Guarded<T> {
  Inserted(T),
  Duplicate,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection, flushing the WAL.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn admin_where(
    &self,
    clause: &'static str,
    param: rusqlite::types::Value,
  ) -> Result<Option<AdminCredentials>> {
    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE {clause}"),
              rusqlite::params![param],
              RawAdmin::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdmin::into_credentials).transpose()
  }

  async fn movements(&self, limit: Option<u32>) -> Result<Vec<Movement>> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map_or(-1, i64::from);

    let raws: Vec<RawMovement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{MOVEMENT_SELECT} ORDER BY e.event_id DESC LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit], RawMovement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMovement::into_movement).collect()
  }

  async fn grouped_active_members(
    &self,
    column: &'static str,
  ) -> Result<Vec<LabelCount>> {
    let groups: Vec<(Option<String>, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {column}, COUNT(*) FROM members
           WHERE status = 'active'
           GROUP BY {column}"
        ))?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(merge_counts(
      groups.into_iter().map(|(label, n)| (label, n.max(0) as u64)),
    ))
  }
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  // ── Member directory ──────────────────────────────────────────────────────

  async fn add_member(&self, member: ValidMember) -> Result<Member> {
    let registered_at = Utc::now();
    let at_str = encode_dt(registered_at);
    let insert = member.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken = tx
          .query_row(
            "SELECT 1 FROM members WHERE identity_key = ?1 AND status = 'active'",
            rusqlite::params![insert.identity_key],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Guarded::Duplicate);
        }

        tx.execute(
          "INSERT INTO members (
             name, surname, phone, gender, affiliation,
             identity_key, registered_at, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active')",
          rusqlite::params![
            insert.name,
            insert.surname,
            insert.phone,
            insert.gender,
            insert.affiliation,
            insert.identity_key,
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Guarded::Inserted(id))
      })
      .await?;

    match outcome {
      Guarded::Inserted(member_id) => Ok(Member {
        member_id,
        name: member.name,
        surname: member.surname,
        phone: member.phone,
        gender: member.gender,
        affiliation: member.affiliation,
        registered_at,
        status: MemberStatus::Active,
      }),
      Guarded::Duplicate => Err(
        pointage_core::Error::DuplicatePerson {
          name:    member.name,
          surname: member.surname,
        }
        .into(),
      ),
    }
  }

  async fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
    let raw: Option<RawMember> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = ?1"),
              rusqlite::params![id],
              RawMember::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMember::into_member).transpose()
  }

  async fn search_by_phone(&self, fragment: String) -> Result<Vec<Member>> {
    if !is_searchable_fragment(&fragment) {
      return Ok(Vec::new());
    }
    let pattern = like_contains(fragment.trim());

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEMBER_COLUMNS} FROM members
           WHERE phone LIKE ?1 ESCAPE '\\' AND status = 'active'
           ORDER BY name COLLATE NOCASE, surname COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  async fn list_members(&self, include_inactive: bool) -> Result<Vec<Member>> {
    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let filter = if include_inactive {
          ""
        } else {
          "WHERE status = 'active'"
        };
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEMBER_COLUMNS} FROM members {filter}
           ORDER BY name COLLATE NOCASE, surname COLLATE NOCASE, member_id"
        ))?;
        let rows = stmt
          .query_map([], RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  async fn deactivate_member(&self, id: MemberId) -> Result<Member> {
    let raw: Option<RawMember> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Matching an already-inactive row still counts as a change, which
        // makes repeated deactivation a no-op success.
        let changed = tx.execute(
          "UPDATE members SET status = 'inactive' WHERE member_id = ?1",
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = ?1"),
          rusqlite::params![id],
          RawMember::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    match raw {
      Some(raw) => {
        tracing::info!(member_id = id, "member deactivated");
        raw.into_member()
      }
      None => Err(pointage_core::Error::MemberNotFound(id).into()),
    }
  }

  // ── Event log ─────────────────────────────────────────────────────────────

  async fn toggle_presence(
    &self,
    member_id: MemberId,
    reason: Option<String>,
  ) -> Result<(Member, Event)> {
    let outcome: Option<(RawMember, Event)> = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock before the read, so the latest event
        // cannot change between the decision and the insert.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let member = tx
          .query_row(
            &format!(
              "SELECT {MEMBER_COLUMNS} FROM members
               WHERE member_id = ?1 AND status = 'active'"
            ),
            rusqlite::params![member_id],
            RawMember::from_row,
          )
          .optional()?;
        let Some(member) = member else {
          return Ok(None);
        };

        let last: Option<EventKind> = tx
          .query_row(
            "SELECT kind FROM latest_events WHERE member_id = ?1",
            rusqlite::params![member_id],
            |row| enum_column(row, 0),
          )
          .optional()?;

        let new_event = next_event(member_id, last, reason);
        let recorded_at = Utc::now();

        tx.execute(
          "INSERT INTO events (member_id, kind, reason, recorded_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            new_event.member_id,
            new_event.kind.as_ref(),
            new_event.reason,
            encode_dt(recorded_at),
          ],
        )?;
        let event_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Some((member, Event {
          event_id,
          member_id,
          kind: new_event.kind,
          reason: new_event.reason,
          recorded_at,
        })))
      })
      .await?;

    let (raw, event) =
      outcome.ok_or(pointage_core::Error::MemberNotFound(member_id))?;
    Ok((raw.into_member()?, event))
  }

  async fn latest_event(&self, member_id: MemberId) -> Result<Option<Event>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EVENT_COLUMNS} FROM latest_events WHERE member_id = ?1"
              ),
              rusqlite::params![member_id],
              RawEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_present(&self) -> Result<Vec<PresentMember>> {
    let raws: Vec<RawPresent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT m.member_id, m.name, m.surname, m.phone, m.affiliation,
                  l.recorded_at
           FROM latest_events l
           JOIN members m ON m.member_id = l.member_id
           WHERE l.kind = 'entry' AND m.status = 'active'
           ORDER BY l.event_id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPresent {
              member_id:   row.get(0)?,
              name:        row.get(1)?,
              surname:     row.get(2)?,
              phone:       row.get(3)?,
              affiliation: row.get(4)?,
              entered_at:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPresent::into_present).collect()
  }

  async fn history(&self, limit: u32) -> Result<Vec<Movement>> {
    self.movements(Some(limit)).await
  }

  async fn all_movements(&self) -> Result<Vec<Movement>> {
    self.movements(None).await
  }

  // ── Admins ────────────────────────────────────────────────────────────────

  async fn bootstrap_superadmin(
    &self,
    username: String,
    password_hash: String,
  ) -> Result<bool> {
    let at_str = encode_dt(Utc::now());
    let role = AdminRole::Superadmin.as_ref().to_owned();
    let name = username.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let present = tx
          .query_row(
            "SELECT 1 FROM admins WHERE admin_id = ?1",
            rusqlite::params![PROTECTED_ADMIN_ID],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if present {
          return Ok(None);
        }

        let taken = tx
          .query_row(
            "SELECT 1 FROM admins WHERE username = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Some(Guarded::Duplicate));
        }

        tx.execute(
          "INSERT INTO admins
             (admin_id, username, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![PROTECTED_ADMIN_ID, name, password_hash, role, at_str],
        )?;
        tx.commit()?;
        Ok(Some(Guarded::Inserted(())))
      })
      .await?;

    match outcome {
      None => Ok(false),
      Some(Guarded::Inserted(())) => Ok(true),
      Some(Guarded::Duplicate) => {
        Err(pointage_core::Error::DuplicateUsername(username).into())
      }
    }
  }

  async fn add_admin(
    &self,
    username: String,
    password_hash: String,
    role: AdminRole,
  ) -> Result<Admin> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let role_str = role.as_ref().to_owned();
    let name = username.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM admins WHERE username = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Guarded::Duplicate);
        }
        tx.execute(
          "INSERT INTO admins (username, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name, password_hash, role_str, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Guarded::Inserted(id))
      })
      .await?;

    match outcome {
      Guarded::Inserted(admin_id) => Ok(Admin {
        admin_id,
        username,
        role,
        created_at,
      }),
      Guarded::Duplicate => {
        Err(pointage_core::Error::DuplicateUsername(username).into())
      }
    }
  }

  async fn find_admin_by_username(
    &self,
    username: String,
  ) -> Result<Option<AdminCredentials>> {
    self.admin_where("username = ?1", username.into()).await
  }

  async fn get_admin_credentials(
    &self,
    id: AdminId,
  ) -> Result<Option<AdminCredentials>> {
    self.admin_where("admin_id = ?1", id.into()).await
  }

  async fn list_admins(&self) -> Result<Vec<Admin>> {
    let raws: Vec<RawAdmin> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY admin_id"
        ))?;
        let rows = stmt
          .query_map([], RawAdmin::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAdmin::into_admin).collect()
  }

  async fn replace_password_hash(
    &self,
    id: AdminId,
    expected_hash: String,
    new_hash: String,
  ) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE admins SET password_hash = ?1
           WHERE admin_id = ?2 AND password_hash = ?3",
          rusqlite::params![new_hash, id, expected_hash],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }

  async fn delete_admin(&self, id: AdminId) -> Result<()> {
    if id == PROTECTED_ADMIN_ID {
      return Err(pointage_core::Error::ProtectedAdmin(id).into());
    }

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM admins WHERE admin_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(pointage_core::Error::AdminNotFound(id).into());
    }
    Ok(())
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn summary(&self) -> Result<Summary> {
    let (total, present): (i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM members WHERE status = 'active'),
             (SELECT COUNT(*)
                FROM latest_events l
                JOIN members m ON m.member_id = l.member_id
                WHERE l.kind = 'entry' AND m.status = 'active')",
          [],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(Summary {
      total_members: total.max(0) as u64,
      present_now:   present.max(0) as u64,
    })
  }

  async fn count_by_gender(&self) -> Result<Vec<LabelCount>> {
    self.grouped_active_members("gender").await
  }

  async fn count_by_affiliation(&self) -> Result<Vec<LabelCount>> {
    self.grouped_active_members("affiliation").await
  }

  async fn top_members(&self, limit: u32) -> Result<Vec<MemberVisits>> {
    let limit = i64::from(limit.clamp(1, MAX_TOP_MEMBERS));

    let rows: Vec<(MemberId, String, String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.member_id, m.name, m.surname, COUNT(e.event_id) AS entries
           FROM events e
           JOIN members m ON m.member_id = e.member_id
           WHERE e.kind = 'entry'
           GROUP BY m.member_id
           ORDER BY entries DESC, m.member_id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(member_id, name, surname, entries)| MemberVisits {
          member_id,
          name,
          surname,
          entries: entries.max(0) as u64,
        })
        .collect(),
    )
  }

  async fn daily_entries(&self, days: u32) -> Result<Vec<DailyCount>> {
    let days = days.clamp(1, MAX_DAILY_WINDOW);
    let today = Utc::now().date_naive();
    let first_day = today
      .checked_sub_days(Days::new(u64::from(days - 1)))
      .unwrap_or(NaiveDate::MIN);
    let since = encode_dt(first_day.and_time(NaiveTime::MIN).and_utc());

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT substr(recorded_at, 1, 10) AS day, COUNT(*)
           FROM events
           WHERE kind = 'entry' AND recorded_at >= ?1
           GROUP BY day",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![since], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let counts = rows
      .into_iter()
      .map(|(day, n)| {
        NaiveDate::parse_from_str(&day, "%Y-%m-%d")
          .map(|d| (d, n.max(0) as u64))
          .map_err(|e| Error::DateParse(e.to_string()))
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(daily_series(today, days, &counts))
  }

  async fn reason_tally(&self) -> Result<Vec<LabelCount>> {
    let reasons: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT reason FROM events
           WHERE kind = 'entry' AND reason IS NOT NULL",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(tally_reasons(reasons.iter().map(String::as_str)))
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  async fn reset_members(&self) -> Result<ResetCounts> {
    let (events, members) = self
      .conn
      .call(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let events = tx.execute("DELETE FROM events", [])?;
        let members = tx.execute("DELETE FROM members", [])?;
        tx.execute(
          "DELETE FROM sqlite_sequence WHERE name IN ('events', 'members')",
          [],
        )?;
        tx.commit()?;
        Ok((events, members))
      })
      .await?;

    tracing::warn!(members, events, "all members and events deleted");
    Ok(ResetCounts {
      members: members as u64,
      events:  events as u64,
    })
  }
}
