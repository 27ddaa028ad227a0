//! SQL schema for the Tutela SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id    TEXT PRIMARY KEY,
    given_name    TEXT NOT NULL,
    family_name   TEXT NOT NULL,
    birth_date    TEXT NOT NULL,    -- ISO 8601 date
    email         TEXT,
    avatar        TEXT NOT NULL,
    color_theme   TEXT NOT NULL,
    connected     INTEGER NOT NULL DEFAULT 0,
    last_seen_at  TEXT,
    anonymized_at TEXT,             -- set once by anonymizing erasure
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS progress (
    progress_id       TEXT PRIMARY KEY,
    subject_id        TEXT NOT NULL REFERENCES subjects(subject_id),
    exercise          TEXT NOT NULL,
    attempts          INTEGER NOT NULL,
    correct           INTEGER NOT NULL,
    last_practiced_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    subject_id TEXT REFERENCES subjects(subject_id),   -- NULL once detached
    started_at TEXT NOT NULL,
    ended_at   TEXT,
    client     TEXT
);

CREATE TABLE IF NOT EXISTS revisions (
    revision_id TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL REFERENCES subjects(subject_id),
    exercise    TEXT NOT NULL,
    score       INTEGER NOT NULL,
    revised_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    file_id       TEXT PRIMARY KEY,
    subject_id    TEXT NOT NULL REFERENCES subjects(subject_id),
    original_name TEXT NOT NULL,
    content_hash  TEXT NOT NULL,   -- SHA-256 hex of the file content
    media_type    TEXT NOT NULL,
    size_bytes    INTEGER NOT NULL,
    uploaded_at   TEXT NOT NULL
);

-- No foreign key on subject_id: completed requests are retained as
-- evidence after the subject row is hard-deleted.
CREATE TABLE IF NOT EXISTS consent_requests (
    request_id    TEXT PRIMARY KEY,
    subject_id    TEXT NOT NULL,
    kind          TEXT NOT NULL,   -- 'data_access' | 'data_deletion' | ...
    token         TEXT NOT NULL UNIQUE,
    status        TEXT NOT NULL,   -- 'pending' | 'verified' | 'completed'
    contact_email TEXT NOT NULL,
    details       TEXT,
    created_at    TEXT NOT NULL,
    expires_at    TEXT NOT NULL
);

-- The audit log is strictly append-only; the implicit rowid gives the
-- hash chain its total order. No UPDATE or DELETE is ever issued against
-- this table. No foreign key on subject_id: entries outlive hard-deleted
-- subjects.
CREATE TABLE IF NOT EXISTS audit_log (
    entry_id    TEXT PRIMARY KEY,
    subject_id  TEXT,
    action      TEXT NOT NULL,     -- 'create' | 'read' | 'update' | 'delete' | 'export' | 'anonymize'
    data_type   TEXT NOT NULL,
    detail      TEXT NOT NULL,
    actor_ip    TEXT,
    user_agent  TEXT,
    request_id  TEXT,
    recorded_at TEXT NOT NULL,     -- ISO 8601 UTC; server-assigned
    prev_hash   TEXT NOT NULL,
    entry_hash  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS progress_subject_idx  ON progress(subject_id);
CREATE INDEX IF NOT EXISTS sessions_subject_idx  ON sessions(subject_id);
CREATE INDEX IF NOT EXISTS revisions_subject_idx ON revisions(subject_id);
CREATE INDEX IF NOT EXISTS files_subject_idx     ON files(subject_id);
CREATE INDEX IF NOT EXISTS consent_sweep_idx     ON consent_requests(status, expires_at);
CREATE INDEX IF NOT EXISTS audit_subject_idx     ON audit_log(subject_id);
CREATE INDEX IF NOT EXISTS audit_recorded_idx    ON audit_log(recorded_at);

PRAGMA user_version = 1;
";
