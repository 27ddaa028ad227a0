//! Per-subject advisory locks.
//!
//! Every consent-gated operation runs its verify-act-log sequence while
//! holding the lock for its subject, so two requests touching the same
//! subject serialize instead of interleaving. This table is the only
//! cross-request mutable state kept in memory.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use uuid::Uuid;

/// Lock table keyed by subject id. Entries are created on first use and
/// kept for the lifetime of the process.
#[derive(Default)]
pub struct SubjectLocks {
  inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl SubjectLocks {
  pub fn new() -> Self {
    Self::default()
  }

  /// Acquire the lock for one subject, waiting if another operation
  /// holds it. The guard is owned so it can live across await points.
  pub async fn acquire(&self, subject_id: Uuid) -> tokio::sync::OwnedMutexGuard<()> {
    let lock = {
      let mut table = match self.inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
      };
      Arc::clone(table.entry(subject_id).or_default())
    };
    lock.lock_owned().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn same_subject_serializes() {
    let locks = SubjectLocks::new();
    let id = Uuid::new_v4();

    let first = locks.acquire(id).await;
    // With the guard held, a second acquire must not resolve.
    tokio::select! {
      _ = locks.acquire(id) => panic!("lock acquired twice"),
      _ = tokio::time::sleep(std::time::Duration::from_millis(20)) => {}
    }

    drop(first);
    let _second = locks.acquire(id).await;
  }

  #[tokio::test]
  async fn different_subjects_are_independent() {
    let locks = SubjectLocks::new();
    let _held = locks.acquire(Uuid::new_v4()).await;
    // A different subject's lock is immediately available.
    let _other = locks.acquire(Uuid::new_v4()).await;
  }
}
