//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; calendar dates as
//! `YYYY-MM-DD`. Enum discriminants are stored as their serde snake_case
//! tags. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use tutela_core::{
  audit::{ActorContext, AuditAction, AuditLogEntry},
  consent::{ConsentKind, ConsentRequest, ConsentStatus},
  records::{AttachedFile, ProgressRecord, RevisionRecord, SessionRecord},
  subject::Subject,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enum discriminants ──────────────────────────────────────────────────────

pub fn decode_consent_kind(s: &str) -> Result<ConsentKind> {
  match s {
    "data_access" => Ok(ConsentKind::DataAccess),
    "data_deletion" => Ok(ConsentKind::DataDeletion),
    "data_portability" => Ok(ConsentKind::DataPortability),
    "consent_withdrawal" => Ok(ConsentKind::ConsentWithdrawal),
    other => Err(Error::Decode(format!("consent kind: {other:?}"))),
  }
}

pub fn decode_consent_status(s: &str) -> Result<ConsentStatus> {
  match s {
    "pending" => Ok(ConsentStatus::Pending),
    "verified" => Ok(ConsentStatus::Verified),
    "completed" => Ok(ConsentStatus::Completed),
    other => Err(Error::Decode(format!("consent status: {other:?}"))),
  }
}

pub fn decode_action(s: &str) -> Result<AuditAction> {
  match s {
    "create" => Ok(AuditAction::Create),
    "read" => Ok(AuditAction::Read),
    "update" => Ok(AuditAction::Update),
    "delete" => Ok(AuditAction::Delete),
    "export" => Ok(AuditAction::Export),
    "anonymize" => Ok(AuditAction::Anonymize),
    other => Err(Error::Decode(format!("audit action: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id:    String,
  pub given_name:    String,
  pub family_name:   String,
  pub birth_date:    String,
  pub email:         Option<String>,
  pub avatar:        String,
  pub color_theme:   String,
  pub connected:     bool,
  pub last_seen_at:  Option<String>,
  pub anonymized_at: Option<String>,
  pub created_at:    String,
}

impl RawSubject {
  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id:    decode_uuid(&self.subject_id)?,
      given_name:    self.given_name,
      family_name:   self.family_name,
      birth_date:    decode_date(&self.birth_date)?,
      email:         self.email,
      avatar:        self.avatar,
      color_theme:   self.color_theme,
      connected:     self.connected,
      last_seen_at:  self.last_seen_at.as_deref().map(decode_dt).transpose()?,
      anonymized_at: self.anonymized_at.as_deref().map(decode_dt).transpose()?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `progress` row.
pub struct RawProgress {
  pub progress_id:       String,
  pub subject_id:        String,
  pub exercise:          String,
  pub attempts:          u32,
  pub correct:           u32,
  pub last_practiced_at: String,
}

impl RawProgress {
  pub fn into_progress(self) -> Result<ProgressRecord> {
    Ok(ProgressRecord {
      progress_id:       decode_uuid(&self.progress_id)?,
      subject_id:        decode_uuid(&self.subject_id)?,
      exercise:          self.exercise,
      attempts:          self.attempts,
      correct:           self.correct,
      last_practiced_at: decode_dt(&self.last_practiced_at)?,
    })
  }
}

/// Raw strings read directly from a `sessions` row.
pub struct RawSession {
  pub session_id: String,
  pub subject_id: Option<String>,
  pub started_at: String,
  pub ended_at:   Option<String>,
  pub client:     Option<String>,
}

impl RawSession {
  pub fn into_session(self) -> Result<SessionRecord> {
    Ok(SessionRecord {
      session_id: decode_uuid(&self.session_id)?,
      subject_id: self
        .subject_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      started_at: decode_dt(&self.started_at)?,
      ended_at:   self.ended_at.as_deref().map(decode_dt).transpose()?,
      client:     self.client,
    })
  }
}

/// Raw strings read directly from a `revisions` row.
pub struct RawRevision {
  pub revision_id: String,
  pub subject_id:  String,
  pub exercise:    String,
  pub score:       i64,
  pub revised_at:  String,
}

impl RawRevision {
  pub fn into_revision(self) -> Result<RevisionRecord> {
    Ok(RevisionRecord {
      revision_id: decode_uuid(&self.revision_id)?,
      subject_id:  decode_uuid(&self.subject_id)?,
      exercise:    self.exercise,
      score:       self.score,
      revised_at:  decode_dt(&self.revised_at)?,
    })
  }
}

/// Raw strings read directly from a `files` row.
pub struct RawFile {
  pub file_id:       String,
  pub subject_id:    String,
  pub original_name: String,
  pub content_hash:  String,
  pub media_type:    String,
  pub size_bytes:    i64,
  pub uploaded_at:   String,
}

impl RawFile {
  pub fn into_file(self) -> Result<AttachedFile> {
    Ok(AttachedFile {
      file_id:       decode_uuid(&self.file_id)?,
      subject_id:    decode_uuid(&self.subject_id)?,
      original_name: self.original_name,
      content_hash:  self.content_hash,
      media_type:    self.media_type,
      size_bytes:    self.size_bytes.max(0) as u64,
      uploaded_at:   decode_dt(&self.uploaded_at)?,
    })
  }
}

/// Raw strings read directly from a `consent_requests` row.
pub struct RawConsent {
  pub request_id:    String,
  pub subject_id:    String,
  pub kind:          String,
  pub token:         String,
  pub status:        String,
  pub contact_email: String,
  pub details:       Option<String>,
  pub created_at:    String,
  pub expires_at:    String,
}

impl RawConsent {
  pub fn into_consent(self) -> Result<ConsentRequest> {
    Ok(ConsentRequest {
      request_id:    decode_uuid(&self.request_id)?,
      subject_id:    decode_uuid(&self.subject_id)?,
      kind:          decode_consent_kind(&self.kind)?,
      token:         self.token,
      status:        decode_consent_status(&self.status)?,
      contact_email: self.contact_email,
      details:       self.details,
      created_at:    decode_dt(&self.created_at)?,
      expires_at:    decode_dt(&self.expires_at)?,
    })
  }
}

/// Raw strings read directly from an `audit_log` row.
pub struct RawAuditEntry {
  pub entry_id:    String,
  pub subject_id:  Option<String>,
  pub action:      String,
  pub data_type:   String,
  pub detail:      String,
  pub actor_ip:    Option<String>,
  pub user_agent:  Option<String>,
  pub request_id:  Option<String>,
  pub recorded_at: String,
  pub prev_hash:   String,
  pub entry_hash:  String,
}

impl RawAuditEntry {
  pub fn into_entry(self) -> Result<AuditLogEntry> {
    Ok(AuditLogEntry {
      entry_id:    decode_uuid(&self.entry_id)?,
      subject_id:  self
        .subject_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      action:      decode_action(&self.action)?,
      data_type:   self.data_type,
      detail:      self.detail,
      actor:       ActorContext {
        ip:         self.actor_ip,
        user_agent: self.user_agent,
        request_id: self.request_id,
      },
      recorded_at: decode_dt(&self.recorded_at)?,
      prev_hash:   self.prev_hash,
      entry_hash:  self.entry_hash,
    })
  }
}
