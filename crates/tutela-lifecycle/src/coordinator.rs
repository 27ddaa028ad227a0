//! The lifecycle coordinator — the single entry point for consent-gated
//! operations.
//!
//! Every operation runs verify → act → log under its subject's advisory
//! lock: consent is checked before any work, engine work runs under a
//! timeout, and exactly one audit entry is written once the outcome is
//! known. A failed audit write turns even a successful operation into an
//! error.

use std::{future::Future, time::Duration};

use chrono::TimeDelta;
use serde::Serialize;
use uuid::Uuid;

use tutela_core::{
  Error, Result,
  audit::{ActorContext, AuditAction, AuditLogEntry, AuditQuery, NewAuditEntry},
  consent::{ConsentKind, ConsentRequest, NewConsentRequest},
  erasure::{ErasureMode, ErasureResult},
  export::{ExportBundle, ExportFormat},
  store::LifecycleStore,
};

use crate::{
  audit::{AuditTrail, ChainReport},
  consent::{ConsentLedger, DEFAULT_TTL_DAYS},
  erasure::ErasureEngine,
  export::ExportEngine,
  locks::SubjectLocks,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Coordinator policy knobs. [`Default`] gives the production values.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
  /// Upper bound on engine work per operation. Consent verification and
  /// the audit write are not counted against it.
  pub operation_timeout:       Duration,
  /// Allow `request_export` without a consent token. Off by default;
  /// meant for deployments where an outer layer authenticates the caller.
  pub allow_unverified_export: bool,
  /// Lifetime of newly submitted consent requests.
  pub consent_ttl:             TimeDelta,
}

impl Default for CoordinatorConfig {
  fn default() -> Self {
    Self {
      operation_timeout:       Duration::from_secs(30),
      allow_unverified_export: false,
      consent_ttl:             TimeDelta::days(DEFAULT_TTL_DAYS),
    }
  }
}

// ─── Health report ───────────────────────────────────────────────────────────

/// One component's line in the health report.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
  pub ok:     bool,
  pub detail: String,
}

/// Aggregate health across the lifecycle components.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
  pub healthy:        bool,
  pub consent_ledger: ComponentHealth,
  pub erasure:        ComponentHealth,
  pub audit_trail:    ComponentHealth,
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

/// Sequences the ledger, the engines, and the audit trail behind
/// per-subject locks.
pub struct LifecycleCoordinator<S> {
  store:   S,
  ledger:  ConsentLedger<S>,
  export:  ExportEngine<S>,
  erasure: ErasureEngine<S>,
  trail:   AuditTrail<S>,
  locks:   SubjectLocks,
  config:  CoordinatorConfig,
}

impl<S: LifecycleStore + Clone> LifecycleCoordinator<S> {
  pub fn new(store: S, config: CoordinatorConfig) -> Self {
    Self {
      ledger:  ConsentLedger::with_ttl(store.clone(), config.consent_ttl),
      export:  ExportEngine::new(store.clone()),
      erasure: ErasureEngine::new(store.clone()),
      trail:   AuditTrail::new(store.clone()),
      locks:   SubjectLocks::new(),
      store,
      config,
    }
  }

  // ── Consent passthroughs ──────────────────────────────────────────────

  pub async fn submit_consent(
    &self,
    input: NewConsentRequest,
  ) -> Result<ConsentRequest> {
    self.ledger.submit(input).await
  }

  pub async fn verify_consent(&self, token: &str) -> Result<ConsentRequest> {
    self.ledger.verify(token).await
  }

  pub async fn sweep_expired_consents(&self) -> Result<u64> {
    self.ledger.sweep_expired().await
  }

  // ── Consent-gated operations ──────────────────────────────────────────

  /// Export one subject's data. With a token, it must verify for
  /// `DataAccess`/`DataPortability` on this subject and is spent on
  /// success. Without one, the operation needs
  /// [`CoordinatorConfig::allow_unverified_export`].
  ///
  /// `format` does not change the bundle; it is recorded in the audit
  /// entry so the trail shows what the caller was served.
  pub async fn request_export(
    &self,
    subject_id: Uuid,
    token:      Option<&str>,
    format:     ExportFormat,
    actor:      ActorContext,
  ) -> Result<ExportBundle> {
    let _guard = self.locks.acquire(subject_id).await;
    let outcome = self.export_outcome(subject_id, token).await;

    let detail = match &outcome {
      Ok(bundle) => format!(
        "export produced, format={}, {} records",
        format.as_str(),
        bundle.progress.len()
          + bundle.sessions.len()
          + bundle.revisions.len()
          + bundle.files.len(),
      ),
      Err(e) => format!("export failed, format={}: {e}", format.as_str()),
    };
    self
      .trail
      .record(
        NewAuditEntry::new(
          Some(subject_id),
          AuditAction::Export,
          "export_bundle",
          detail,
        )
        .with_actor(actor),
      )
      .await?;
    outcome
  }

  async fn export_outcome(
    &self,
    subject_id: Uuid,
    token:      Option<&str>,
  ) -> Result<ExportBundle> {
    let request = match token {
      Some(token) => Some(
        self
          .ledger
          .verify_for(
            token,
            subject_id,
            &[ConsentKind::DataAccess, ConsentKind::DataPortability],
          )
          .await?,
      ),
      None if self.config.allow_unverified_export => None,
      None => return Err(Error::ConsentInvalid),
    };

    let bundle = self
      .timed(self.export.export_subject(subject_id))
      .await?;

    if let Some(request) = request {
      self.ledger.mark_completed(request.request_id).await?;
    }
    Ok(bundle)
  }

  /// Erase one subject's data in the requested mode. The token must
  /// verify for `DataDeletion` on this subject before any mutation, and
  /// is spent on success.
  pub async fn request_erasure(
    &self,
    subject_id: Uuid,
    token:      &str,
    mode:       ErasureMode,
    actor:      ActorContext,
  ) -> Result<ErasureResult> {
    let _guard = self.locks.acquire(subject_id).await;
    let outcome = self.erasure_outcome(subject_id, token, mode).await;

    let action = match mode {
      ErasureMode::Anonymize => AuditAction::Anonymize,
      ErasureMode::Soft | ErasureMode::Hard => AuditAction::Delete,
    };
    let detail = match &outcome {
      Ok(result) => format!(
        "{mode} erasure complete, {} records affected",
        result.total_affected(),
      ),
      Err(e) => format!("{mode} erasure failed: {e}"),
    };
    self
      .trail
      .record(
        NewAuditEntry::new(Some(subject_id), action, "subject", detail)
          .with_actor(actor),
      )
      .await?;
    outcome
  }

  async fn erasure_outcome(
    &self,
    subject_id: Uuid,
    token:      &str,
    mode:       ErasureMode,
  ) -> Result<ErasureResult> {
    let request = self
      .ledger
      .verify_for(token, subject_id, &[ConsentKind::DataDeletion])
      .await?;
    let result = self
      .timed(self.erasure.erase(subject_id, mode))
      .await?;
    self.ledger.mark_completed(request.request_id).await?;
    Ok(result)
  }

  /// Bound engine work by the configured timeout. Elapsed time is a
  /// failure like any other; it is audited, never reported as success.
  async fn timed<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(self.config.operation_timeout, work).await {
      Ok(outcome) => outcome,
      Err(_) => Err(Error::Timeout(self.config.operation_timeout)),
    }
  }

  // ── Audit and health ──────────────────────────────────────────────────

  /// One subject's audit page plus the total matching-entry count,
  /// ignoring pagination.
  pub async fn audit_log(
    &self,
    subject_id: Uuid,
    query:      &AuditQuery,
  ) -> Result<(Vec<AuditLogEntry>, u64)> {
    let scoped = AuditQuery { subject_id: Some(subject_id), ..query.clone() };
    let entries = self.trail.query(&scoped).await?;
    let total = self.trail.count(&scoped).await?;
    Ok((entries, total))
  }

  pub async fn verify_audit_chain(&self) -> Result<ChainReport> {
    self.trail.verify_chain().await
  }

  /// Probe the store and the audit chain tip.
  pub async fn health(&self) -> HealthReport {
    let storage = match self.store.ping().await {
      Ok(()) => ComponentHealth { ok: true, detail: "store reachable".to_owned() },
      Err(e) => ComponentHealth { ok: false, detail: e.to_string() },
    };
    let tip_query = AuditQuery { limit: Some(1), ..AuditQuery::default() };
    let audit_trail = match self.store.query_audit(&tip_query).await {
      Ok(tip) => ComponentHealth {
        ok:     true,
        detail: match tip.first() {
          Some(entry) => format!("chain tip {}", &entry.entry_hash[..12]),
          None => "empty trail".to_owned(),
        },
      },
      Err(e) => ComponentHealth { ok: false, detail: e.to_string() },
    };
    HealthReport {
      healthy:        storage.ok && audit_trail.ok,
      consent_ledger: storage.clone(),
      erasure:        storage,
      audit_trail,
    }
  }
}
