//! Subject — the student whose personal data the subsystem governs.
//!
//! The subject row carries the directly identifying fields. Everything else
//! about a student lives in the dependent collections (progress, sessions,
//! revisions, files) and is reached through the subject's UUID.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student record. The identity fields are exactly the ones the
/// anonymizer rewrites; the connection-state fields are the only mutable
/// state outside erasure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id:    Uuid,
  pub given_name:    String,
  pub family_name:   String,
  pub birth_date:    NaiveDate,
  pub email:         Option<String>,
  /// Profile avatar selector chosen by the student.
  pub avatar:        String,
  /// Profile colour-theme selector chosen by the student.
  pub color_theme:   String,
  pub connected:     bool,
  pub last_seen_at:  Option<DateTime<Utc>>,
  /// Set exactly once, by the anonymizer. A subject with this stamp has
  /// already had its identity rewritten; re-running anonymization is a
  /// no-op.
  pub anonymized_at: Option<DateTime<Utc>>,
  pub created_at:    DateTime<Utc>,
}

// ─── NewSubject ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::LifecycleStore::add_subject`].
/// `subject_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubject {
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  NaiveDate,
  pub email:       Option<String>,
  pub avatar:      String,
  pub color_theme: String,
}

impl NewSubject {
  /// Convenience constructor with profile selectors at their defaults.
  pub fn new(
    given_name: impl Into<String>,
    family_name: impl Into<String>,
    birth_date: NaiveDate,
  ) -> Self {
    Self {
      given_name:  given_name.into(),
      family_name: family_name.into(),
      birth_date,
      email:       None,
      avatar:      "default".to_owned(),
      color_theme: "default".to_owned(),
    }
  }
}

// ─── Anonymous identity ──────────────────────────────────────────────────────

/// The replacement field set written over a subject row by anonymizing
/// erasure. Generated fresh per erasure so anonymized rows remain
/// distinguishable from one another without being linkable to the person.
#[derive(Debug, Clone)]
pub struct AnonymousIdentity {
  pub given_name:  String,
  pub family_name: String,
  pub birth_date:  NaiveDate,
  pub avatar:      String,
  pub color_theme: String,
}

impl AnonymousIdentity {
  /// Fixed placeholder written into `given_name`. Also serves as the
  /// externally observable marker that a row has been anonymized.
  pub const GIVEN_NAME: &'static str = "Anonymous";
  /// Prefix for the generated `family_name` placeholder.
  pub const FAMILY_PREFIX: &'static str = "User-";
  /// Value written into both profile selectors.
  pub const SELECTOR: &'static str = "default";

  /// Generate a fresh replacement identity. The family-name suffix is the
  /// first eight hex characters of a newly minted UUID.
  pub fn generate() -> Self {
    let suffix = Uuid::new_v4().simple().to_string();
    Self {
      given_name:  Self::GIVEN_NAME.to_owned(),
      family_name: format!("{}{}", Self::FAMILY_PREFIX, &suffix[..8]),
      birth_date:  NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
      avatar:      Self::SELECTOR.to_owned(),
      color_theme: Self::SELECTOR.to_owned(),
    }
  }
}
