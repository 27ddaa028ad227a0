//! The `LifecycleStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `tutela-store-sqlite`). The lifecycle engines depend on this
//! abstraction, not on any concrete backend, which is also what lets tests
//! substitute recording or failing doubles.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  audit::{AuditLogEntry, AuditQuery, NewAuditEntry},
  consent::{ConsentRequest, ConsentStatus},
  erasure::ErasureStep,
  records::{
    AttachedFile, NewFile, NewProgress, NewRevision, NewSession,
    ProgressRecord, RevisionRecord, SessionRecord,
  },
  subject::{AnonymousIdentity, NewSubject, Subject},
};

/// Abstraction over a Tutela storage backend.
///
/// The audit table is append-only; consent rows are mutated only through
/// `set_consent_status` and the expiry sweep; erasure is expressed as
/// single-table primitives so callers control (and tests observe) the
/// sequencing.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LifecycleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects and dependent records ────────────────────────────────────

  /// Create and persist a new subject. `subject_id` and `created_at` are
  /// set by the store.
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Retrieve a subject by UUID. Returns `None` if not found.
  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Record aggregated practice totals for one exercise.
  fn record_progress(
    &self,
    input: NewProgress,
  ) -> impl Future<Output = Result<ProgressRecord, Self::Error>> + Send + '_;

  /// Record a login session. `started_at` is set by the store. Also marks
  /// the subject connected and stamps its `last_seen_at`; soft erasure is
  /// what clears both again.
  fn record_session(
    &self,
    input: NewSession,
  ) -> impl Future<Output = Result<SessionRecord, Self::Error>> + Send + '_;

  /// Record one completed exercise review.
  fn record_revision(
    &self,
    input: NewRevision,
  ) -> impl Future<Output = Result<RevisionRecord, Self::Error>> + Send + '_;

  /// Record an uploaded file's metadata.
  fn attach_file(
    &self,
    input: NewFile,
  ) -> impl Future<Output = Result<AttachedFile, Self::Error>> + Send + '_;

  fn progress_for(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ProgressRecord>, Self::Error>> + Send + '_;

  fn sessions_for(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SessionRecord>, Self::Error>> + Send + '_;

  fn revisions_for(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RevisionRecord>, Self::Error>> + Send + '_;

  fn files_for(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AttachedFile>, Self::Error>> + Send + '_;

  // ── Erasure primitives ────────────────────────────────────────────────

  /// Soft erasure: clear `connected` and `last_seen_at` on the subject
  /// row. Returns the number of rows changed (0 when the subject does not
  /// exist).
  fn disconnect_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Overwrite the subject's identity fields with `identity`, clear the
  /// email and connection state, and stamp `anonymized_at`. Returns the
  /// number of rows changed.
  fn anonymize_subject(
    &self,
    subject_id: Uuid,
    identity: AnonymousIdentity,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Null out `subject_id` on the subject's sessions. Idempotent: already
  /// detached rows are not counted again.
  fn detach_sessions(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Replace original file names with the scrub placeholder. Idempotent:
  /// already scrubbed rows are not counted again.
  fn scrub_file_names(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Hard-delete the rows of one table for one subject. Each call is a
  /// single atomic statement; sequencing across steps belongs to the
  /// erasure engine.
  fn erase_step(
    &self,
    subject_id: Uuid,
    step: ErasureStep,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Consent ───────────────────────────────────────────────────────────

  /// Persist a fully formed consent request. The ledger owns token
  /// generation and expiry; the store writes what it is given.
  fn insert_consent(
    &self,
    request: ConsentRequest,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Look up a consent request by its token. Returns `None` if no row
  /// matches; policy (expiry, status, subject binding) is the ledger's.
  fn consent_by_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<ConsentRequest>, Self::Error>> + Send + 'a;

  fn consent_by_id(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<ConsentRequest>, Self::Error>> + Send + '_;

  /// Set a consent request's status. Returns `false` if no row matched.
  fn set_consent_status(
    &self,
    request_id: Uuid,
    status: ConsentStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete expired rows still in `pending` status. Verified and
  /// completed rows are never touched. Returns the number deleted.
  fn sweep_expired_consents(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Audit trail ──────────────────────────────────────────────────────

  /// Append one audit entry, assigning id, timestamp, and chain hashes.
  /// Appends are serialised by the backend so the chain never forks.
  fn append_audit(
    &self,
    input: NewAuditEntry,
  ) -> impl Future<Output = Result<AuditLogEntry, Self::Error>> + Send + '_;

  /// Query entries, newest first, with limit/offset pagination.
  fn query_audit<'a>(
    &'a self,
    query: &'a AuditQuery,
  ) -> impl Future<Output = Result<Vec<AuditLogEntry>, Self::Error>> + Send + 'a;

  /// Count the entries matching `query`, ignoring its pagination fields.
  fn count_audit<'a>(
    &'a self,
    query: &'a AuditQuery,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// The full trail in append order (oldest first), for chain
  /// verification.
  fn audit_chain(
    &self,
  ) -> impl Future<Output = Result<Vec<AuditLogEntry>, Self::Error>> + Send + '_;

  // ── Health ────────────────────────────────────────────────────────────

  /// Cheap connectivity probe.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
