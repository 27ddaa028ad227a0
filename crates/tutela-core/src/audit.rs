//! Audit trail types and hash-chain computation.
//!
//! Every lifecycle operation leaves exactly one entry. Entries are
//! append-only; no update or delete is ever exposed. Tamper evidence comes
//! from chaining: each entry's hash covers its own fields plus the previous
//! entry's hash, so altering or removing any historical entry breaks every
//! link after it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Hash recorded as the predecessor of the first entry in the trail.
pub const GENESIS_HASH: &str =
  "0000000000000000000000000000000000000000000000000000000000000000";

/// What an entry records happening to personal data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
  Create,
  Read,
  Update,
  Delete,
  Export,
  Anonymize,
}

impl AuditAction {
  /// The discriminant string stored in the `action` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Read => "read",
      Self::Update => "update",
      Self::Delete => "delete",
      Self::Export => "export",
      Self::Anonymize => "anonymize",
    }
  }
}

/// Request-context metadata captured alongside each entry. All fields are
/// best-effort; a missing field is recorded as absent, never invented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
  pub ip:         Option<String>,
  pub user_agent: Option<String>,
  pub request_id: Option<String>,
}

/// One immutable audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
  pub entry_id:    Uuid,
  /// Absent for entries not tied to one subject (e.g. sweep runs).
  pub subject_id:  Option<Uuid>,
  pub action:      AuditAction,
  /// Coarse tag for what was touched, e.g. `subject`, `export_bundle`.
  pub data_type:   String,
  /// Human-readable outcome description. Never contains tokens.
  pub detail:      String,
  pub actor:       ActorContext,
  /// Server-assigned; never changes after creation.
  pub recorded_at: DateTime<Utc>,
  /// `entry_hash` of the previous entry, or [`GENESIS_HASH`].
  pub prev_hash:   String,
  /// SHA-256 over `prev_hash` and this entry's own fields.
  pub entry_hash:  String,
}

impl AuditLogEntry {
  /// Recompute this entry's hash from its fields and the given
  /// predecessor hash. Used by chain verification.
  pub fn recompute_hash(&self, prev_hash: &str) -> String {
    hash_fields(
      prev_hash,
      self.entry_id,
      self.recorded_at,
      self.subject_id,
      self.action,
      &self.data_type,
      &self.detail,
      &self.actor,
    )
  }
}

// ─── NewAuditEntry ───────────────────────────────────────────────────────────

/// Input to [`crate::store::LifecycleStore::append_audit`].
/// Identity, timestamp, and both hashes are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
  pub subject_id: Option<Uuid>,
  pub action:     AuditAction,
  pub data_type:  String,
  pub detail:     String,
  pub actor:      ActorContext,
}

impl NewAuditEntry {
  pub fn new(
    subject_id: Option<Uuid>,
    action: AuditAction,
    data_type: impl Into<String>,
    detail: impl Into<String>,
  ) -> Self {
    Self {
      subject_id,
      action,
      data_type: data_type.into(),
      detail:    detail.into(),
      actor:     ActorContext::default(),
    }
  }

  pub fn with_actor(mut self, actor: ActorContext) -> Self {
    self.actor = actor;
    self
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::LifecycleStore::query_audit`].
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
  pub subject_id: Option<Uuid>,
  pub action:     Option<AuditAction>,
  pub data_type:  Option<String>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

impl AuditQuery {
  /// Page size applied when `limit` is absent.
  pub const DEFAULT_LIMIT: usize = 100;
}

// ─── Chain hash ──────────────────────────────────────────────────────────────

/// Compute the chained hash for a new entry about to be appended.
///
/// The store calls this inside its serialised write path with the current
/// tail hash, the assigned entry id, and the assigned timestamp.
pub fn chain_hash(
  prev_hash: &str,
  entry_id: Uuid,
  recorded_at: DateTime<Utc>,
  input: &NewAuditEntry,
) -> String {
  hash_fields(
    prev_hash,
    entry_id,
    recorded_at,
    input.subject_id,
    input.action,
    &input.data_type,
    &input.detail,
    &input.actor,
  )
}

#[allow(clippy::too_many_arguments)]
fn hash_fields(
  prev_hash: &str,
  entry_id: Uuid,
  recorded_at: DateTime<Utc>,
  subject_id: Option<Uuid>,
  action: AuditAction,
  data_type: &str,
  detail: &str,
  actor: &ActorContext,
) -> String {
  // Presence bytes keep `None` distinct from any real value.
  fn update_opt(hasher: &mut Sha256, field: Option<&[u8]>) {
    match field {
      Some(bytes) => {
        hasher.update([1]);
        hasher.update(bytes);
      }
      None => hasher.update([0]),
    }
  }

  let mut hasher = Sha256::new();
  hasher.update(prev_hash.as_bytes());
  hasher.update(entry_id.as_bytes());
  hasher.update(recorded_at.timestamp_micros().to_le_bytes());
  update_opt(&mut hasher, subject_id.as_ref().map(|id| id.as_bytes().as_slice()));
  hasher.update(action.as_str().as_bytes());
  hasher.update([0]);
  hasher.update(data_type.as_bytes());
  hasher.update([0]);
  hasher.update(detail.as_bytes());
  hasher.update([0]);
  update_opt(&mut hasher, actor.ip.as_deref().map(str::as_bytes));
  update_opt(&mut hasher, actor.user_agent.as_deref().map(str::as_bytes));
  update_opt(&mut hasher, actor.request_id.as_deref().map(str::as_bytes));
  hex::encode(hasher.finalize())
}
