//! Consent requests — the time-boxed authorizations for lifecycle
//! operations.
//!
//! A consent request binds a secret token to one (subject, kind) pair and
//! moves through a strict one-way state machine:
//!
//! ```text
//! pending ──verify──▶ verified ──complete──▶ completed
//!    │
//!    └─(expiry sweep deletes)
//! ```
//!
//! Only the consent ledger mutates these rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a consent request authorizes. Maps onto the GDPR request kinds
/// the platform supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentKind {
  DataAccess,
  DataDeletion,
  DataPortability,
  ConsentWithdrawal,
}

impl ConsentKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::DataAccess => "data_access",
      Self::DataDeletion => "data_deletion",
      Self::DataPortability => "data_portability",
      Self::ConsentWithdrawal => "consent_withdrawal",
    }
  }
}

/// Where a consent request sits in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
  Pending,
  Verified,
  Completed,
}

impl ConsentStatus {
  /// The discriminant string stored in the `status` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Verified => "verified",
      Self::Completed => "completed",
    }
  }
}

/// A consent request row. The token is the only secret in the subsystem;
/// it never appears in audit details or server logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRequest {
  pub request_id:    Uuid,
  pub subject_id:    Uuid,
  pub kind:          ConsentKind,
  /// 64 lowercase hex characters (256 bits of OS entropy), fixed width.
  pub token:         String,
  pub status:        ConsentStatus,
  pub contact_email: String,
  pub details:       Option<String>,
  pub created_at:    DateTime<Utc>,
  pub expires_at:    DateTime<Utc>,
}

impl ConsentRequest {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    now >= self.expires_at
  }

  /// Whether this request can still authorize its operation at `now`.
  /// Completed requests never authorize again; neither do expired ones,
  /// regardless of status.
  pub fn authorizes(&self, now: DateTime<Utc>) -> bool {
    !self.is_expired(now)
      && matches!(self.status, ConsentStatus::Pending | ConsentStatus::Verified)
  }
}

/// Input to the consent ledger's `submit`. Token, status, and the two
/// timestamps are always assigned by the ledger.
#[derive(Debug, Clone)]
pub struct NewConsentRequest {
  pub subject_id:    Uuid,
  pub kind:          ConsentKind,
  pub contact_email: String,
  pub details:       Option<String>,
}
