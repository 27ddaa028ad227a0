//! Test double: wraps a real [`SqliteStore`], records every call, and can
//! inject a failure or a delay keyed by method label.
//!
//! `erase_step` calls are labelled `erase_step:<table>` so ordering
//! assertions can tell the steps apart.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use chrono::{DateTime, Utc};
use tutela_core::{
  Result,
  audit::{AuditLogEntry, AuditQuery, NewAuditEntry},
  consent::{ConsentRequest, ConsentStatus},
  erasure::ErasureStep,
  records::{
    AttachedFile, NewFile, NewProgress, NewRevision, NewSession,
    ProgressRecord, RevisionRecord, SessionRecord,
  },
  store::LifecycleStore,
  subject::{AnonymousIdentity, NewSubject, Subject},
};
use tutela_store_sqlite::SqliteStore;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub(crate) enum DoubleError {
  #[error(transparent)]
  Store(#[from] tutela_store_sqlite::Error),
  #[error("injected failure in {0}")]
  Injected(String),
}

#[derive(Clone)]
pub(crate) struct ScriptedStore {
  inner:    SqliteStore,
  calls:    Arc<Mutex<Vec<String>>>,
  fail_on:  Arc<Mutex<Option<String>>>,
  delay_on: Arc<Mutex<Option<(String, Duration)>>>,
}

impl ScriptedStore {
  /// Open an in-memory store and wrap it. The inner handle is returned
  /// too, for direct setup and inspection.
  pub(crate) async fn wrap() -> (SqliteStore, ScriptedStore) {
    let inner = SqliteStore::open_in_memory().await.expect("in-memory store");
    let scripted = ScriptedStore {
      inner:    inner.clone(),
      calls:    Arc::default(),
      fail_on:  Arc::default(),
      delay_on: Arc::default(),
    };
    (inner, scripted)
  }

  pub(crate) fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub(crate) fn fail_on(&self, label: &str) {
    *self.fail_on.lock().unwrap() = Some(label.to_owned());
  }

  pub(crate) fn clear_failure(&self) {
    *self.fail_on.lock().unwrap() = None;
  }

  pub(crate) fn delay_on(&self, label: &str, delay: Duration) {
    *self.delay_on.lock().unwrap() = Some((label.to_owned(), delay));
  }

  async fn gate(&self, label: &str) -> Result<(), DoubleError> {
    self.calls.lock().unwrap().push(label.to_owned());
    let delay = self
      .delay_on
      .lock()
      .unwrap()
      .clone()
      .filter(|(l, _)| l == label)
      .map(|(_, d)| d);
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    if self.fail_on.lock().unwrap().as_deref() == Some(label) {
      return Err(DoubleError::Injected(label.to_owned()));
    }
    Ok(())
  }
}

impl LifecycleStore for ScriptedStore {
  type Error = DoubleError;

  async fn add_subject(&self, input: NewSubject) -> Result<Subject, DoubleError> {
    self.gate("add_subject").await?;
    Ok(self.inner.add_subject(input).await?)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>, DoubleError> {
    self.gate("get_subject").await?;
    Ok(self.inner.get_subject(id).await?)
  }

  async fn record_progress(
    &self,
    input: NewProgress,
  ) -> Result<ProgressRecord, DoubleError> {
    self.gate("record_progress").await?;
    Ok(self.inner.record_progress(input).await?)
  }

  async fn record_session(
    &self,
    input: NewSession,
  ) -> Result<SessionRecord, DoubleError> {
    self.gate("record_session").await?;
    Ok(self.inner.record_session(input).await?)
  }

  async fn record_revision(
    &self,
    input: NewRevision,
  ) -> Result<RevisionRecord, DoubleError> {
    self.gate("record_revision").await?;
    Ok(self.inner.record_revision(input).await?)
  }

  async fn attach_file(&self, input: NewFile) -> Result<AttachedFile, DoubleError> {
    self.gate("attach_file").await?;
    Ok(self.inner.attach_file(input).await?)
  }

  async fn progress_for(
    &self,
    subject_id: Uuid,
  ) -> Result<Vec<ProgressRecord>, DoubleError> {
    self.gate("progress_for").await?;
    Ok(self.inner.progress_for(subject_id).await?)
  }

  async fn sessions_for(
    &self,
    subject_id: Uuid,
  ) -> Result<Vec<SessionRecord>, DoubleError> {
    self.gate("sessions_for").await?;
    Ok(self.inner.sessions_for(subject_id).await?)
  }

  async fn revisions_for(
    &self,
    subject_id: Uuid,
  ) -> Result<Vec<RevisionRecord>, DoubleError> {
    self.gate("revisions_for").await?;
    Ok(self.inner.revisions_for(subject_id).await?)
  }

  async fn files_for(
    &self,
    subject_id: Uuid,
  ) -> Result<Vec<AttachedFile>, DoubleError> {
    self.gate("files_for").await?;
    Ok(self.inner.files_for(subject_id).await?)
  }

  async fn disconnect_subject(&self, subject_id: Uuid) -> Result<u64, DoubleError> {
    self.gate("disconnect_subject").await?;
    Ok(self.inner.disconnect_subject(subject_id).await?)
  }

  async fn anonymize_subject(
    &self,
    subject_id: Uuid,
    identity: AnonymousIdentity,
  ) -> Result<u64, DoubleError> {
    self.gate("anonymize_subject").await?;
    Ok(self.inner.anonymize_subject(subject_id, identity).await?)
  }

  async fn detach_sessions(&self, subject_id: Uuid) -> Result<u64, DoubleError> {
    self.gate("detach_sessions").await?;
    Ok(self.inner.detach_sessions(subject_id).await?)
  }

  async fn scrub_file_names(&self, subject_id: Uuid) -> Result<u64, DoubleError> {
    self.gate("scrub_file_names").await?;
    Ok(self.inner.scrub_file_names(subject_id).await?)
  }

  async fn erase_step(
    &self,
    subject_id: Uuid,
    step: ErasureStep,
  ) -> Result<u64, DoubleError> {
    self.gate(&format!("erase_step:{step}")).await?;
    Ok(self.inner.erase_step(subject_id, step).await?)
  }

  async fn insert_consent(&self, request: ConsentRequest) -> Result<(), DoubleError> {
    self.gate("insert_consent").await?;
    Ok(self.inner.insert_consent(request).await?)
  }

  async fn consent_by_token(
    &self,
    token: &str,
  ) -> Result<Option<ConsentRequest>, DoubleError> {
    self.gate("consent_by_token").await?;
    Ok(self.inner.consent_by_token(token).await?)
  }

  async fn consent_by_id(
    &self,
    request_id: Uuid,
  ) -> Result<Option<ConsentRequest>, DoubleError> {
    self.gate("consent_by_id").await?;
    Ok(self.inner.consent_by_id(request_id).await?)
  }

  async fn set_consent_status(
    &self,
    request_id: Uuid,
    status: ConsentStatus,
  ) -> Result<bool, DoubleError> {
    self.gate("set_consent_status").await?;
    Ok(self.inner.set_consent_status(request_id, status).await?)
  }

  async fn sweep_expired_consents(
    &self,
    now: DateTime<Utc>,
  ) -> Result<u64, DoubleError> {
    self.gate("sweep_expired_consents").await?;
    Ok(self.inner.sweep_expired_consents(now).await?)
  }

  async fn append_audit(
    &self,
    input: NewAuditEntry,
  ) -> Result<AuditLogEntry, DoubleError> {
    self.gate("append_audit").await?;
    Ok(self.inner.append_audit(input).await?)
  }

  async fn query_audit(
    &self,
    query: &AuditQuery,
  ) -> Result<Vec<AuditLogEntry>, DoubleError> {
    self.gate("query_audit").await?;
    Ok(self.inner.query_audit(query).await?)
  }

  async fn count_audit(&self, query: &AuditQuery) -> Result<u64, DoubleError> {
    self.gate("count_audit").await?;
    Ok(self.inner.count_audit(query).await?)
  }

  async fn audit_chain(&self) -> Result<Vec<AuditLogEntry>, DoubleError> {
    self.gate("audit_chain").await?;
    Ok(self.inner.audit_chain().await?)
  }

  async fn ping(&self) -> Result<(), DoubleError> {
    self.gate("ping").await?;
    Ok(self.inner.ping().await?)
  }
}
