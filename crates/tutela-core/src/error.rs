//! Error types for `tutela-core`.
//!
//! This is the full error taxonomy for lifecycle operations. Storage backends
//! define their own error types and surface here through the boxed-source
//! variants.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::erasure::{ErasureMode, ErasureStep};

/// Boxed error type used where the concrete backend error is not known.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// A consent request named a subject that does not exist.
  #[error("invalid subject: {0}")]
  InvalidSubject(Uuid),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  /// Deliberately cause-free. Callers must not be able to tell whether a
  /// token was unknown, expired, already spent, bound to another subject,
  /// or of the wrong kind. The specific cause is logged server-side only.
  #[error("consent invalid")]
  ConsentInvalid,

  /// An erasure sequence failed partway through. `completed` holds the
  /// steps that finished before `failed`; a retry of the same mode will
  /// pick up where this attempt stopped.
  #[error("{mode} erasure incomplete: failed at step {failed}")]
  ErasureIncomplete {
    mode:      ErasureMode,
    completed: Vec<ErasureStep>,
    failed:    ErasureStep,
    #[source]
    source:    BoxError,
  },

  /// The audit trail could not be written. The enclosing operation must
  /// report this even if its own work succeeded.
  #[error("audit write failed: {0}")]
  AuditWriteFailed(#[source] BoxError),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] BoxError),

  #[error("operation timed out after {0:?}")]
  Timeout(Duration),
}

impl Error {
  /// Wrap a backend error as [`Error::StorageUnavailable`].
  pub fn storage<E>(source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StorageUnavailable(Box::new(source))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
