//! The export engine — assembles portability bundles on read.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use tutela_core::{Error, Result, export::ExportBundle, store::LifecycleStore};

/// Builds [`ExportBundle`]s from the store. Bundles are handed straight
/// to the caller; nothing is persisted.
pub struct ExportEngine<S> {
  store: S,
}

impl<S: LifecycleStore> ExportEngine<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Fetch the subject row and all four dependent collections. A subject
  /// with no history still exports: empty collections are valid, and
  /// every data type stays tagged so recipients can tell "none" from
  /// "omitted".
  pub async fn export_subject(&self, subject_id: Uuid) -> Result<ExportBundle> {
    let subject = self
      .store
      .get_subject(subject_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::SubjectNotFound(subject_id))?;

    let progress = self
      .store
      .progress_for(subject_id)
      .await
      .map_err(Error::storage)?;
    let sessions = self
      .store
      .sessions_for(subject_id)
      .await
      .map_err(Error::storage)?;
    let revisions = self
      .store
      .revisions_for(subject_id)
      .await
      .map_err(Error::storage)?;
    let files = self
      .store
      .files_for(subject_id)
      .await
      .map_err(Error::storage)?;

    let records =
      progress.len() + sessions.len() + revisions.len() + files.len();
    let bundle = ExportBundle {
      subject,
      progress,
      sessions,
      revisions,
      files,
      exported_at: Utc::now(),
      data_types: ExportBundle::DATA_TYPES
        .iter()
        .map(|t| (*t).to_owned())
        .collect(),
    };
    info!(subject_id = %subject_id, records, "export bundle assembled");
    Ok(bundle)
  }
}
