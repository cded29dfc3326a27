//! SQL schema for the Pointage SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Members are soft-deleted through `status`; phone is deliberately not unique.
CREATE TABLE IF NOT EXISTS members (
    member_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    surname       TEXT NOT NULL,
    phone         TEXT NOT NULL,
    gender        TEXT NOT NULL DEFAULT 'Non spécifié',
    affiliation   TEXT NOT NULL DEFAULT 'Membre',
    identity_key  TEXT NOT NULL,   -- case-folded (name, surname)
    registered_at TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    status        TEXT NOT NULL DEFAULT 'active'
                  CHECK (status IN ('active', 'inactive'))
);

-- Events are strictly append-only.
-- No UPDATE is ever issued against this table.
CREATE TABLE IF NOT EXISTS events (
    event_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id   INTEGER NOT NULL
                REFERENCES members(member_id) ON DELETE CASCADE,
    kind        TEXT NOT NULL CHECK (kind IN ('entry', 'exit')),
    reason      TEXT,
    recorded_at TEXT NOT NULL,
    CHECK (kind = 'entry' OR reason IS NULL)
);

CREATE TABLE IF NOT EXISTS admins (
    admin_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    role          TEXT NOT NULL CHECK (role IN ('admin', 'superadmin')),
    created_at    TEXT NOT NULL
);

-- The single most recent event of every member. Backs the presence toggle,
-- the list of people present, and the present counter.
CREATE VIEW IF NOT EXISTS latest_events AS
    SELECT e.event_id, e.member_id, e.kind, e.reason, e.recorded_at
    FROM events e
    WHERE e.event_id = (
        SELECT MAX(event_id) FROM events WHERE member_id = e.member_id
    );

CREATE UNIQUE INDEX IF NOT EXISTS members_active_identity_idx
    ON members(identity_key) WHERE status = 'active';
CREATE INDEX IF NOT EXISTS members_phone_idx    ON members(phone);
CREATE INDEX IF NOT EXISTS members_status_idx   ON members(status);
CREATE INDEX IF NOT EXISTS events_member_idx    ON events(member_id, event_id);
CREATE INDEX IF NOT EXISTS events_recorded_idx  ON events(recorded_at);

PRAGMA user_version = 1;
";
