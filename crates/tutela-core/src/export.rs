//! The export bundle — the portable snapshot of one subject's data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  records::{AttachedFile, ProgressRecord, RevisionRecord, SessionRecord},
  subject::Subject,
};

/// Serialization formats the export surface offers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
  #[default]
  Json,
  Csv,
}

impl ExportFormat {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Json => "json",
      Self::Csv => "csv",
    }
  }

  /// File extension used in the download filename.
  pub fn extension(&self) -> &'static str {
    self.as_str()
  }
}

/// Everything the platform holds about one subject, assembled on read and
/// never stored. Empty collections are valid and stay tagged in
/// `data_types` so recipients can tell "none" from "omitted".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
  pub subject:     Subject,
  pub progress:    Vec<ProgressRecord>,
  pub sessions:    Vec<SessionRecord>,
  pub revisions:   Vec<RevisionRecord>,
  pub files:       Vec<AttachedFile>,
  /// The point in time at which this bundle was assembled.
  pub exported_at: DateTime<Utc>,
  pub data_types:  Vec<String>,
}

impl ExportBundle {
  /// Collection tags, in bundle order.
  pub const DATA_TYPES: [&'static str; 5] =
    ["subject", "progress", "sessions", "revisions", "files"];
}
