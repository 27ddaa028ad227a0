//! Erasure modes, step ordering, and result types.
//!
//! Hard deletion is a fixed sequence of single-table deletes, children
//! strictly before the subject row. Any interrupted run therefore leaves a
//! referentially sound prefix that a retry completes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How thoroughly a subject's data is erased.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErasureMode {
  /// Clear connection state only. Reversible; all data retained.
  Soft,
  /// Rewrite identity fields, detach sessions, scrub file names.
  /// Statistical records are retained. The platform default.
  #[default]
  Anonymize,
  /// Physically delete the subject and every dependent record.
  Hard,
}

impl ErasureMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Soft => "soft",
      Self::Anonymize => "anonymize",
      Self::Hard => "hard",
    }
  }
}

impl fmt::Display for ErasureMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One table-level unit of an erasure sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErasureStep {
  Files,
  Revisions,
  Sessions,
  Progress,
  Subject,
}

impl ErasureStep {
  /// Hard-deletion order. Children before the subject row; violating this
  /// order is a correctness bug, not a style preference.
  pub const HARD_ORDER: [ErasureStep; 5] = [
    ErasureStep::Files,
    ErasureStep::Revisions,
    ErasureStep::Sessions,
    ErasureStep::Progress,
    ErasureStep::Subject,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Files => "files",
      Self::Revisions => "revisions",
      Self::Sessions => "sessions",
      Self::Progress => "progress",
      Self::Subject => "subject",
    }
  }
}

impl fmt::Display for ErasureStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Result types ────────────────────────────────────────────────────────────

/// Row count for one completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
  pub step:     ErasureStep,
  pub affected: u64,
}

/// The outcome of a fully completed erasure. Produced by the erasure
/// engine, consumed by the coordinator; never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErasureResult {
  pub mode:      ErasureMode,
  pub erased_at: DateTime<Utc>,
  pub affected:  Vec<StepReport>,
}

impl ErasureResult {
  pub fn total_affected(&self) -> u64 {
    self.affected.iter().map(|r| r.affected).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hard_order_ends_with_the_subject_row() {
    assert_eq!(ErasureStep::HARD_ORDER.len(), 5);
    assert_eq!(ErasureStep::HARD_ORDER[4], ErasureStep::Subject);
    // Every dependent table precedes the subject delete.
    assert!(
      ErasureStep::HARD_ORDER[..4]
        .iter()
        .all(|s| *s != ErasureStep::Subject)
    );
  }

  #[test]
  fn totals_sum_across_steps() {
    let result = ErasureResult {
      mode:      ErasureMode::Hard,
      erased_at: Utc::now(),
      affected:  vec![
        StepReport { step: ErasureStep::Files, affected: 2 },
        StepReport { step: ErasureStep::Subject, affected: 1 },
      ],
    };
    assert_eq!(result.total_affected(), 3);
  }
}
