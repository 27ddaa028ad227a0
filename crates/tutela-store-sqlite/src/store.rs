//! [`SqliteStore`] — the SQLite implementation of [`LifecycleStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tutela_core::{
  audit::{AuditLogEntry, AuditQuery, GENESIS_HASH, NewAuditEntry, chain_hash},
  consent::{ConsentRequest, ConsentStatus},
  erasure::ErasureStep,
  records::{
    AttachedFile, NewFile, NewProgress, NewRevision, NewSession,
    ProgressRecord, RevisionRecord, SCRUBBED_FILE_NAME, SessionRecord,
  },
  store::LifecycleStore,
  subject::{AnonymousIdentity, NewSubject, Subject},
};

use crate::{
  Error, Result,
  encode::{
    RawAuditEntry, RawConsent, RawFile, RawProgress, RawRevision, RawSession,
    RawSubject, encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tutela lifecycle store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements run on one serialised connection, which is what makes the
/// audit-chain read-then-insert in [`append_audit`] fork-free.
///
/// [`append_audit`]: LifecycleStore::append_audit
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
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

  /// Run one parameterless-row UPDATE/DELETE and report the rows changed.
  async fn execute_for_subject(
    &self,
    sql: &'static str,
    subject_id: Uuid,
  ) -> Result<u64> {
    let id_str = encode_uuid(subject_id);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str])?))
      .await?;
    Ok(changed as u64)
  }
}

fn step_table(step: ErasureStep) -> &'static str {
  match step {
    ErasureStep::Files => "files",
    ErasureStep::Revisions => "revisions",
    ErasureStep::Sessions => "sessions",
    ErasureStep::Progress => "progress",
    ErasureStep::Subject => "subjects",
  }
}

// ─── LifecycleStore impl ─────────────────────────────────────────────────────

impl LifecycleStore for SqliteStore {
  type Error = Error;

  // ── Subjects and dependent records ────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
      subject_id:    Uuid::new_v4(),
      given_name:    input.given_name,
      family_name:   input.family_name,
      birth_date:    input.birth_date,
      email:         input.email,
      avatar:        input.avatar,
      color_theme:   input.color_theme,
      connected:     false,
      last_seen_at:  None,
      anonymized_at: None,
      created_at:    Utc::now(),
    };

    let id_str     = encode_uuid(subject.subject_id);
    let birth_str  = encode_date(subject.birth_date);
    let at_str     = encode_dt(subject.created_at);
    let given      = subject.given_name.clone();
    let family     = subject.family_name.clone();
    let email      = subject.email.clone();
    let avatar     = subject.avatar.clone();
    let theme      = subject.color_theme.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (
             subject_id, given_name, family_name, birth_date, email,
             avatar, color_theme, connected, last_seen_at, anonymized_at,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, NULL, ?8)",
          rusqlite::params![
            id_str, given, family, birth_str, email, avatar, theme, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT subject_id, given_name, family_name, birth_date, email,
                    avatar, color_theme, connected, last_seen_at,
                    anonymized_at, created_at
             FROM subjects WHERE subject_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawSubject {
                subject_id:    row.get(0)?,
                given_name:    row.get(1)?,
                family_name:   row.get(2)?,
                birth_date:    row.get(3)?,
                email:         row.get(4)?,
                avatar:        row.get(5)?,
                color_theme:   row.get(6)?,
                connected:     row.get(7)?,
                last_seen_at:  row.get(8)?,
                anonymized_at: row.get(9)?,
                created_at:    row.get(10)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn record_progress(&self, input: NewProgress) -> Result<ProgressRecord> {
    let record = ProgressRecord {
      progress_id:       Uuid::new_v4(),
      subject_id:        input.subject_id,
      exercise:          input.exercise,
      attempts:          input.attempts,
      correct:           input.correct,
      last_practiced_at: Utc::now(),
    };

    let id_str      = encode_uuid(record.progress_id);
    let subject_str = encode_uuid(record.subject_id);
    let exercise    = record.exercise.clone();
    let attempts    = record.attempts;
    let correct     = record.correct;
    let at_str      = encode_dt(record.last_practiced_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO progress (
             progress_id, subject_id, exercise, attempts, correct,
             last_practiced_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, subject_str, exercise, attempts, correct, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn record_session(&self, input: NewSession) -> Result<SessionRecord> {
    let record = SessionRecord {
      session_id: Uuid::new_v4(),
      subject_id: Some(input.subject_id),
      started_at: Utc::now(),
      ended_at:   None,
      client:     input.client,
    };

    let id_str      = encode_uuid(record.session_id);
    let subject_str = encode_uuid(input.subject_id);
    let at_str      = encode_dt(record.started_at);
    let client      = record.client.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (session_id, subject_id, started_at, ended_at, client)
           VALUES (?1, ?2, ?3, NULL, ?4)",
          rusqlite::params![id_str, subject_str, at_str, client],
        )?;
        // A new session is what "connected" means.
        conn.execute(
          "UPDATE subjects SET connected = 1, last_seen_at = ?2
           WHERE subject_id = ?1",
          rusqlite::params![subject_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn record_revision(&self, input: NewRevision) -> Result<RevisionRecord> {
    let record = RevisionRecord {
      revision_id: Uuid::new_v4(),
      subject_id:  input.subject_id,
      exercise:    input.exercise,
      score:       input.score,
      revised_at:  Utc::now(),
    };

    let id_str      = encode_uuid(record.revision_id);
    let subject_str = encode_uuid(record.subject_id);
    let exercise    = record.exercise.clone();
    let score       = record.score;
    let at_str      = encode_dt(record.revised_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO revisions (revision_id, subject_id, exercise, score, revised_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, subject_str, exercise, score, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn attach_file(&self, input: NewFile) -> Result<AttachedFile> {
    let record = AttachedFile {
      file_id:       Uuid::new_v4(),
      subject_id:    input.subject_id,
      original_name: input.original_name,
      content_hash:  input.content_hash,
      media_type:    input.media_type,
      size_bytes:    input.size_bytes,
      uploaded_at:   Utc::now(),
    };

    let id_str      = encode_uuid(record.file_id);
    let subject_str = encode_uuid(record.subject_id);
    let name        = record.original_name.clone();
    let hash        = record.content_hash.clone();
    let media       = record.media_type.clone();
    let size        = record.size_bytes as i64;
    let at_str      = encode_dt(record.uploaded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO files (
             file_id, subject_id, original_name, content_hash, media_type,
             size_bytes, uploaded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, subject_str, name, hash, media, size, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn progress_for(&self, subject_id: Uuid) -> Result<Vec<ProgressRecord>> {
    let id_str = encode_uuid(subject_id);

    let raws: Vec<RawProgress> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT progress_id, subject_id, exercise, attempts, correct,
                  last_practiced_at
           FROM progress WHERE subject_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawProgress {
              progress_id:       row.get(0)?,
              subject_id:        row.get(1)?,
              exercise:          row.get(2)?,
              attempts:          row.get(3)?,
              correct:           row.get(4)?,
              last_practiced_at: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProgress::into_progress).collect()
  }

  async fn sessions_for(&self, subject_id: Uuid) -> Result<Vec<SessionRecord>> {
    let id_str = encode_uuid(subject_id);

    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT session_id, subject_id, started_at, ended_at, client
           FROM sessions WHERE subject_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawSession {
              session_id: row.get(0)?,
              subject_id: row.get(1)?,
              started_at: row.get(2)?,
              ended_at:   row.get(3)?,
              client:     row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn revisions_for(&self, subject_id: Uuid) -> Result<Vec<RevisionRecord>> {
    let id_str = encode_uuid(subject_id);

    let raws: Vec<RawRevision> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT revision_id, subject_id, exercise, score, revised_at
           FROM revisions WHERE subject_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawRevision {
              revision_id: row.get(0)?,
              subject_id:  row.get(1)?,
              exercise:    row.get(2)?,
              score:       row.get(3)?,
              revised_at:  row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRevision::into_revision).collect()
  }

  async fn files_for(&self, subject_id: Uuid) -> Result<Vec<AttachedFile>> {
    let id_str = encode_uuid(subject_id);

    let raws: Vec<RawFile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT file_id, subject_id, original_name, content_hash,
                  media_type, size_bytes, uploaded_at
           FROM files WHERE subject_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawFile {
              file_id:       row.get(0)?,
              subject_id:    row.get(1)?,
              original_name: row.get(2)?,
              content_hash:  row.get(3)?,
              media_type:    row.get(4)?,
              size_bytes:    row.get(5)?,
              uploaded_at:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFile::into_file).collect()
  }

  // ── Erasure primitives ────────────────────────────────────────────────────

  async fn disconnect_subject(&self, subject_id: Uuid) -> Result<u64> {
    self
      .execute_for_subject(
        "UPDATE subjects SET connected = 0, last_seen_at = NULL
         WHERE subject_id = ?1",
        subject_id,
      )
      .await
  }

  async fn anonymize_subject(
    &self,
    subject_id: Uuid,
    identity: AnonymousIdentity,
  ) -> Result<u64> {
    let id_str    = encode_uuid(subject_id);
    let birth_str = encode_date(identity.birth_date);
    let at_str    = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET
             given_name = ?2, family_name = ?3, birth_date = ?4,
             email = NULL, avatar = ?5, color_theme = ?6,
             connected = 0, last_seen_at = NULL, anonymized_at = ?7
           WHERE subject_id = ?1",
          rusqlite::params![
            id_str,
            identity.given_name,
            identity.family_name,
            birth_str,
            identity.avatar,
            identity.color_theme,
            at_str,
          ],
        )?)
      })
      .await?;
    Ok(changed as u64)
  }

  async fn detach_sessions(&self, subject_id: Uuid) -> Result<u64> {
    // The WHERE clause only matches still-attached rows, so re-running
    // reports zero.
    self
      .execute_for_subject(
        "UPDATE sessions SET subject_id = NULL WHERE subject_id = ?1",
        subject_id,
      )
      .await
  }

  async fn scrub_file_names(&self, subject_id: Uuid) -> Result<u64> {
    let id_str = encode_uuid(subject_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE files SET original_name = ?2
           WHERE subject_id = ?1 AND original_name != ?2",
          rusqlite::params![id_str, SCRUBBED_FILE_NAME],
        )?)
      })
      .await?;
    Ok(changed as u64)
  }

  async fn erase_step(&self, subject_id: Uuid, step: ErasureStep) -> Result<u64> {
    let id_str = encode_uuid(subject_id);
    let sql = format!("DELETE FROM {} WHERE subject_id = ?1", step_table(step));

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![id_str])?))
      .await?;
    Ok(changed as u64)
  }

  // ── Consent ───────────────────────────────────────────────────────────────

  async fn insert_consent(&self, request: ConsentRequest) -> Result<()> {
    let id_str      = encode_uuid(request.request_id);
    let subject_str = encode_uuid(request.subject_id);
    let kind_str    = request.kind.as_str();
    let status_str  = request.status.as_str();
    let created_str = encode_dt(request.created_at);
    let expires_str = encode_dt(request.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO consent_requests (
             request_id, subject_id, kind, token, status, contact_email,
             details, created_at, expires_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            subject_str,
            kind_str,
            request.token,
            status_str,
            request.contact_email,
            request.details,
            created_str,
            expires_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn consent_by_token(&self, token: &str) -> Result<Option<ConsentRequest>> {
    let token = token.to_owned();

    let raw: Option<RawConsent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT request_id, subject_id, kind, token, status,
                    contact_email, details, created_at, expires_at
             FROM consent_requests WHERE token = ?1",
            rusqlite::params![token],
            consent_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawConsent::into_consent).transpose()
  }

  async fn consent_by_id(&self, request_id: Uuid) -> Result<Option<ConsentRequest>> {
    let id_str = encode_uuid(request_id);

    let raw: Option<RawConsent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT request_id, subject_id, kind, token, status,
                    contact_email, details, created_at, expires_at
             FROM consent_requests WHERE request_id = ?1",
            rusqlite::params![id_str],
            consent_from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawConsent::into_consent).transpose()
  }

  async fn set_consent_status(
    &self,
    request_id: Uuid,
    status: ConsentStatus,
  ) -> Result<bool> {
    let id_str     = encode_uuid(request_id);
    let status_str = status.as_str();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE consent_requests SET status = ?2 WHERE request_id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn sweep_expired_consents(&self, now: chrono::DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM consent_requests
           WHERE status = 'pending' AND expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(deleted as u64)
  }

  // ── Audit trail ───────────────────────────────────────────────────────────

  async fn append_audit(&self, input: NewAuditEntry) -> Result<AuditLogEntry> {
    let entry_id    = Uuid::new_v4();
    let recorded_at = Utc::now();

    let id_str      = encode_uuid(entry_id);
    let subject_str = input.subject_id.map(encode_uuid);
    let action_str  = input.action.as_str();
    let at_str      = encode_dt(recorded_at);
    let for_hash    = input.clone();

    let (prev_hash, entry_hash) = self
      .conn
      .call(move |conn| {
        // Tail read and insert share the serialised connection, so
        // concurrent appends cannot fork the chain.
        let tail: Option<String> = conn
          .query_row(
            "SELECT entry_hash FROM audit_log ORDER BY rowid DESC LIMIT 1",
            [],
            |row| row.get(0),
          )
          .optional()?;
        let prev_hash = tail.unwrap_or_else(|| GENESIS_HASH.to_owned());
        let entry_hash = chain_hash(&prev_hash, entry_id, recorded_at, &for_hash);

        conn.execute(
          "INSERT INTO audit_log (
             entry_id, subject_id, action, data_type, detail,
             actor_ip, user_agent, request_id, recorded_at,
             prev_hash, entry_hash
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            subject_str,
            action_str,
            for_hash.data_type,
            for_hash.detail,
            for_hash.actor.ip,
            for_hash.actor.user_agent,
            for_hash.actor.request_id,
            at_str,
            prev_hash,
            entry_hash,
          ],
        )?;
        Ok((prev_hash, entry_hash))
      })
      .await?;

    Ok(AuditLogEntry {
      entry_id,
      subject_id: input.subject_id,
      action:     input.action,
      data_type:  input.data_type,
      detail:     input.detail,
      actor:      input.actor,
      recorded_at,
      prev_hash,
      entry_hash,
    })
  }

  async fn query_audit(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>> {
    let subject_str = query.subject_id.map(encode_uuid);
    let action_str  = query.action.map(|a| a.as_str().to_owned());
    let type_str    = query.data_type.clone();
    let limit_val   = query.limit.unwrap_or(AuditQuery::DEFAULT_LIMIT) as i64;
    let offset_val  = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawAuditEntry> = self
      .conn
      .call(move |conn| {
        // `?N IS NULL OR …` keeps the statement static while letting each
        // filter be optional.
        let mut stmt = conn.prepare(
          "SELECT entry_id, subject_id, action, data_type, detail,
                  actor_ip, user_agent, request_id, recorded_at,
                  prev_hash, entry_hash
           FROM audit_log
           WHERE (?1 IS NULL OR subject_id = ?1)
             AND (?2 IS NULL OR action = ?2)
             AND (?3 IS NULL OR data_type = ?3)
           ORDER BY rowid DESC
           LIMIT ?4 OFFSET ?5",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              subject_str, action_str, type_str, limit_val, offset_val,
            ],
            audit_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }

  async fn count_audit(&self, query: &AuditQuery) -> Result<u64> {
    let subject_str = query.subject_id.map(encode_uuid);
    let action_str  = query.action.map(|a| a.as_str().to_owned());
    let type_str    = query.data_type.clone();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM audit_log
           WHERE (?1 IS NULL OR subject_id = ?1)
             AND (?2 IS NULL OR action = ?2)
             AND (?3 IS NULL OR data_type = ?3)",
          rusqlite::params![subject_str, action_str, type_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn audit_chain(&self) -> Result<Vec<AuditLogEntry>> {
    let raws: Vec<RawAuditEntry> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, subject_id, action, data_type, detail,
                  actor_ip, user_agent, request_id, recorded_at,
                  prev_hash, entry_hash
           FROM audit_log ORDER BY rowid ASC",
        )?;
        let rows = stmt
          .query_map([], audit_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }

  // ── Health ────────────────────────────────────────────────────────────────

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn consent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawConsent> {
  Ok(RawConsent {
    request_id:    row.get(0)?,
    subject_id:    row.get(1)?,
    kind:          row.get(2)?,
    token:         row.get(3)?,
    status:        row.get(4)?,
    contact_email: row.get(5)?,
    details:       row.get(6)?,
    created_at:    row.get(7)?,
    expires_at:    row.get(8)?,
  })
}

fn audit_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAuditEntry> {
  Ok(RawAuditEntry {
    entry_id:    row.get(0)?,
    subject_id:  row.get(1)?,
    action:      row.get(2)?,
    data_type:   row.get(3)?,
    detail:      row.get(4)?,
    actor_ip:    row.get(5)?,
    user_agent:  row.get(6)?,
    request_id:  row.get(7)?,
    recorded_at: row.get(8)?,
    prev_hash:   row.get(9)?,
    entry_hash:  row.get(10)?,
  })
}
