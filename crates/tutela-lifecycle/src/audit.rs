//! The audit trail — records lifecycle operations and verifies the hash
//! chain.

use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use tutela_core::{
  Error, Result,
  audit::{AuditLogEntry, AuditQuery, GENESIS_HASH, NewAuditEntry},
  store::LifecycleStore,
};

/// Append-and-query facade over the store's audit log.
pub struct AuditTrail<S> {
  store: S,
}

/// The first broken link found by a chain walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainViolation {
  /// Zero-based position in the trail, oldest first.
  pub position: usize,
  pub entry_id: Uuid,
}

/// Outcome of a full chain walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainReport {
  pub entries:   usize,
  pub violation: Option<ChainViolation>,
}

impl ChainReport {
  pub fn is_intact(&self) -> bool {
    self.violation.is_none()
  }
}

impl<S: LifecycleStore> AuditTrail<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Append one entry. A failed write escalates to
  /// [`Error::AuditWriteFailed`]; the enclosing operation must surface it
  /// even when its own work succeeded.
  pub async fn record(&self, input: NewAuditEntry) -> Result<AuditLogEntry> {
    self.store.append_audit(input).await.map_err(|e| {
      error!(error = %e, "audit write failed");
      Error::AuditWriteFailed(Box::new(e))
    })
  }

  pub async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLogEntry>> {
    self.store.query_audit(query).await.map_err(Error::storage)
  }

  pub async fn count(&self, query: &AuditQuery) -> Result<u64> {
    self.store.count_audit(query).await.map_err(Error::storage)
  }

  /// Walk the whole trail oldest-first, recomputing every link.
  pub async fn verify_chain(&self) -> Result<ChainReport> {
    let chain = self.store.audit_chain().await.map_err(Error::storage)?;
    let report = inspect_chain(&chain);
    if let Some(violation) = &report.violation {
      warn!(
        position = violation.position,
        entry_id = %violation.entry_id,
        "audit chain violation detected"
      );
    }
    Ok(report)
  }
}

/// Check that every entry links to its predecessor and hashes to its
/// recorded value.
fn inspect_chain(chain: &[AuditLogEntry]) -> ChainReport {
  let mut prev = GENESIS_HASH;
  for (position, entry) in chain.iter().enumerate() {
    if entry.prev_hash != prev
      || entry.recompute_hash(prev) != entry.entry_hash
    {
      return ChainReport {
        entries:   chain.len(),
        violation: Some(ChainViolation { position, entry_id: entry.entry_id }),
      };
    }
    prev = &entry.entry_hash;
  }
  ChainReport { entries: chain.len(), violation: None }
}
