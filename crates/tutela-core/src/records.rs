//! Dependent record types — the data graph hanging off a subject.
//!
//! Four collections reference the subject by UUID: practice progress,
//! login sessions, revision history, and uploaded files. Erasure walks
//! them children-first; export bundles them wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder written over a file's original name by anonymizing erasure.
/// Original upload names routinely contain real names or other PII.
pub const SCRUBBED_FILE_NAME: &str = "redacted";

// ─── Progress ────────────────────────────────────────────────────────────────

/// Aggregated practice totals for one exercise. Statistical only; carries
/// no identifying data and is retained under anonymization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
  pub progress_id:       Uuid,
  pub subject_id:        Uuid,
  pub exercise:          String,
  pub attempts:          u32,
  pub correct:           u32,
  pub last_practiced_at: DateTime<Utc>,
}

/// Input to [`crate::store::LifecycleStore::record_progress`].
#[derive(Debug, Clone)]
pub struct NewProgress {
  pub subject_id: Uuid,
  pub exercise:   String,
  pub attempts:   u32,
  pub correct:    u32,
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// A login session. `subject_id` is nullable so anonymization can sever
/// the linkage while keeping the row for usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
  pub session_id: Uuid,
  pub subject_id: Option<Uuid>,
  pub started_at: DateTime<Utc>,
  pub ended_at:   Option<DateTime<Utc>>,
  pub client:     Option<String>,
}

/// Input to [`crate::store::LifecycleStore::record_session`].
/// `started_at` is set by the store; sessions always start attached.
#[derive(Debug, Clone)]
pub struct NewSession {
  pub subject_id: Uuid,
  pub client:     Option<String>,
}

// ─── Revisions ───────────────────────────────────────────────────────────────

/// One completed review of an exercise. Statistical only; retained under
/// anonymization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionRecord {
  pub revision_id: Uuid,
  pub subject_id:  Uuid,
  pub exercise:    String,
  pub score:       i64,
  pub revised_at:  DateTime<Utc>,
}

/// Input to [`crate::store::LifecycleStore::record_revision`].
#[derive(Debug, Clone)]
pub struct NewRevision {
  pub subject_id: Uuid,
  pub exercise:   String,
  pub score:      i64,
}

// ─── Files ───────────────────────────────────────────────────────────────────

/// An uploaded file. Only metadata lives in the store; binary content is
/// addressed by its SHA-256 digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachedFile {
  pub file_id:       Uuid,
  pub subject_id:    Uuid,
  /// Name the file was uploaded under. Scrubbed to
  /// [`SCRUBBED_FILE_NAME`] by anonymizing erasure.
  pub original_name: String,
  /// SHA-256 hex digest of the file content.
  pub content_hash:  String,
  pub media_type:    String,
  pub size_bytes:    u64,
  pub uploaded_at:   DateTime<Utc>,
}

/// Input to [`crate::store::LifecycleStore::attach_file`].
#[derive(Debug, Clone)]
pub struct NewFile {
  pub subject_id:    Uuid,
  pub original_name: String,
  pub content_hash:  String,
  pub media_type:    String,
  pub size_bytes:    u64,
}
