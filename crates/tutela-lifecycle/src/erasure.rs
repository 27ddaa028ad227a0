//! The erasure engine — soft, anonymizing, and hard erasure.
//!
//! Every mode reports per-step row counts. A failure partway through
//! surfaces as [`Error::ErasureIncomplete`] carrying the steps that did
//! finish; because each step is idempotent, retrying the same mode picks
//! up where the failed run stopped.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use tutela_core::{
  Error, Result,
  erasure::{ErasureMode, ErasureResult, ErasureStep, StepReport},
  store::LifecycleStore,
  subject::AnonymousIdentity,
};

/// Removes or rewrites subject data, one mode per call.
pub struct ErasureEngine<S> {
  store: S,
}

fn incomplete<E>(
  mode:      ErasureMode,
  completed: Vec<ErasureStep>,
  failed:    ErasureStep,
  source:    E,
) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::ErasureIncomplete { mode, completed, failed, source: Box::new(source) }
}

impl<S: LifecycleStore> ErasureEngine<S> {
  pub fn new(store: S) -> Self {
    Self { store }
  }

  /// Run one erasure. Erasing an unknown subject is
  /// [`Error::SubjectNotFound`] in every mode.
  pub async fn erase(
    &self,
    subject_id: Uuid,
    mode:       ErasureMode,
  ) -> Result<ErasureResult> {
    let result = match mode {
      ErasureMode::Soft => self.soft(subject_id).await?,
      ErasureMode::Anonymize => self.anonymize(subject_id).await?,
      ErasureMode::Hard => self.hard(subject_id).await?,
    };
    info!(
      subject_id = %subject_id,
      mode = %mode,
      affected = result.total_affected(),
      "erasure complete"
    );
    Ok(result)
  }

  /// Clear connection state. Reversible; the next login re-establishes
  /// it.
  async fn soft(&self, subject_id: Uuid) -> Result<ErasureResult> {
    let affected = self
      .store
      .disconnect_subject(subject_id)
      .await
      .map_err(|e| incomplete(ErasureMode::Soft, vec![], ErasureStep::Subject, e))?;
    if affected == 0 {
      return Err(Error::SubjectNotFound(subject_id));
    }
    Ok(ErasureResult {
      mode:      ErasureMode::Soft,
      erased_at: Utc::now(),
      affected:  vec![StepReport { step: ErasureStep::Subject, affected }],
    })
  }

  /// Rewrite the identity fields, detach sessions, scrub file names.
  /// Statistical records survive untouched.
  async fn anonymize(&self, subject_id: Uuid) -> Result<ErasureResult> {
    let subject = self
      .store
      .get_subject(subject_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::SubjectNotFound(subject_id))?;

    // A second anonymization must not mint a fresh identity over the
    // first. Detaching and scrubbing still run; both are idempotent.
    let identity_rows = if subject.anonymized_at.is_some() {
      0
    } else {
      self
        .store
        .anonymize_subject(subject_id, AnonymousIdentity::generate())
        .await
        .map_err(|e| {
          incomplete(ErasureMode::Anonymize, vec![], ErasureStep::Subject, e)
        })?
    };

    let sessions = self
      .store
      .detach_sessions(subject_id)
      .await
      .map_err(|e| {
        incomplete(
          ErasureMode::Anonymize,
          vec![ErasureStep::Subject],
          ErasureStep::Sessions,
          e,
        )
      })?;
    let files = self.store.scrub_file_names(subject_id).await.map_err(|e| {
      incomplete(
        ErasureMode::Anonymize,
        vec![ErasureStep::Subject, ErasureStep::Sessions],
        ErasureStep::Files,
        e,
      )
    })?;

    Ok(ErasureResult {
      mode:      ErasureMode::Anonymize,
      erased_at: Utc::now(),
      affected:  vec![
        StepReport { step: ErasureStep::Subject, affected: identity_rows },
        StepReport { step: ErasureStep::Sessions, affected: sessions },
        StepReport { step: ErasureStep::Files, affected: files },
      ],
    })
  }

  /// Delete every row, children strictly before the subject.
  async fn hard(&self, subject_id: Uuid) -> Result<ErasureResult> {
    if self
      .store
      .get_subject(subject_id)
      .await
      .map_err(Error::storage)?
      .is_none()
    {
      return Err(Error::SubjectNotFound(subject_id));
    }

    let mut affected = Vec::with_capacity(ErasureStep::HARD_ORDER.len());
    for step in ErasureStep::HARD_ORDER {
      let count = self
        .store
        .erase_step(subject_id, step)
        .await
        .map_err(|e| {
          let completed = affected.iter().map(|r: &StepReport| r.step).collect();
          incomplete(ErasureMode::Hard, completed, step, e)
        })?;
      affected.push(StepReport { step, affected: count });
    }
    Ok(ErasureResult {
      mode: ErasureMode::Hard,
      erased_at: Utc::now(),
      affected,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use tutela_core::{
    records::{NewFile, NewProgress, NewRevision, NewSession, SCRUBBED_FILE_NAME},
    subject::NewSubject,
  };
  use tutela_store_sqlite::SqliteStore;

  use crate::test_store::ScriptedStore;

  use super::*;

  async fn fixture() -> (SqliteStore, ErasureEngine<SqliteStore>) {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    (store.clone(), ErasureEngine::new(store))
  }

  /// One subject with two progress rows, one session, one revision, and
  /// two files.
  async fn seed_graph(store: &SqliteStore) -> Uuid {
    let birth = NaiveDate::from_ymd_opt(2013, 2, 11).expect("valid date");
    let subject_id = store
      .add_subject(NewSubject {
        given_name:  "Nora".to_owned(),
        family_name: "Quimby".to_owned(),
        birth_date:  birth,
        email:       Some("nora@example.org".to_owned()),
        avatar:      "owl".to_owned(),
        color_theme: "forest".to_owned(),
      })
      .await
      .expect("add subject")
      .subject_id;
    for exercise in ["long-division", "decimals"] {
      store
        .record_progress(NewProgress {
          subject_id,
          exercise: exercise.to_owned(),
          attempts: 5,
          correct: 4,
        })
        .await
        .expect("record progress");
    }
    store
      .record_session(NewSession { subject_id, client: Some("web".to_owned()) })
      .await
      .expect("record session");
    store
      .record_revision(NewRevision {
        subject_id,
        exercise: "long-division".to_owned(),
        score: 92,
      })
      .await
      .expect("record revision");
    for name in ["draft.pdf", "final.pdf"] {
      store
        .attach_file(NewFile {
          subject_id,
          original_name: name.to_owned(),
          content_hash: "b".repeat(64),
          media_type: "application/pdf".to_owned(),
          size_bytes: 512,
        })
        .await
        .expect("attach file");
    }
    subject_id
  }

  #[tokio::test]
  async fn soft_clears_connection_state_and_keeps_data() {
    let (store, engine) = fixture().await;
    let subject_id = seed_graph(&store).await;
    // The seeded session marked the subject connected.
    let before = store.get_subject(subject_id).await.unwrap().unwrap();
    assert!(before.connected);

    let result = engine.erase(subject_id, ErasureMode::Soft).await.unwrap();
    assert_eq!(result.total_affected(), 1);

    let after = store.get_subject(subject_id).await.unwrap().unwrap();
    assert!(!after.connected);
    assert!(after.last_seen_at.is_none());
    assert_eq!(after.given_name, "Nora");
    assert_eq!(store.progress_for(subject_id).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn soft_on_missing_subject_is_not_found() {
    let (_store, engine) = fixture().await;
    let missing = Uuid::new_v4();
    let err = engine.erase(missing, ErasureMode::Soft).await.unwrap_err();
    assert!(matches!(err, Error::SubjectNotFound(id) if id == missing));
  }

  #[tokio::test]
  async fn anonymize_rewrites_identity_and_keeps_statistics() {
    let (store, engine) = fixture().await;
    let subject_id = seed_graph(&store).await;

    let result = engine
      .erase(subject_id, ErasureMode::Anonymize)
      .await
      .unwrap();
    // Subject row, one session, two files.
    assert_eq!(result.total_affected(), 4);

    let subject = store.get_subject(subject_id).await.unwrap().unwrap();
    assert_eq!(subject.given_name, AnonymousIdentity::GIVEN_NAME);
    assert!(subject.family_name.starts_with(AnonymousIdentity::FAMILY_PREFIX));
    assert!(subject.email.is_none());
    assert!(!subject.connected);
    assert!(subject.anonymized_at.is_some());

    // Sessions are detached from the subject, not deleted.
    assert!(store.sessions_for(subject_id).await.unwrap().is_empty());
    // Statistical records survive; files keep content but lose names.
    assert_eq!(store.progress_for(subject_id).await.unwrap().len(), 2);
    assert_eq!(store.revisions_for(subject_id).await.unwrap().len(), 1);
    let files = store.files_for(subject_id).await.unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.original_name == SCRUBBED_FILE_NAME));
    assert!(files.iter().all(|f| f.content_hash == "b".repeat(64)));
  }

  #[tokio::test]
  async fn anonymize_twice_keeps_the_first_identity() {
    let (store, engine) = fixture().await;
    let subject_id = seed_graph(&store).await;

    engine
      .erase(subject_id, ErasureMode::Anonymize)
      .await
      .unwrap();
    let first = store.get_subject(subject_id).await.unwrap().unwrap();

    let second_run = engine
      .erase(subject_id, ErasureMode::Anonymize)
      .await
      .unwrap();
    let identity_step = second_run
      .affected
      .iter()
      .find(|r| r.step == ErasureStep::Subject)
      .expect("subject step");
    assert_eq!(identity_step.affected, 0);

    let second = store.get_subject(subject_id).await.unwrap().unwrap();
    assert_eq!(second.family_name, first.family_name);
    assert_eq!(second.anonymized_at, first.anonymized_at);
  }

  #[tokio::test]
  async fn hard_removes_the_subject_and_every_dependent_row() {
    let (store, engine) = fixture().await;
    let subject_id = seed_graph(&store).await;

    let result = engine.erase(subject_id, ErasureMode::Hard).await.unwrap();
    let steps: Vec<_> = result.affected.iter().map(|r| r.step).collect();
    assert_eq!(steps, ErasureStep::HARD_ORDER);
    let counts: Vec<_> = result.affected.iter().map(|r| r.affected).collect();
    assert_eq!(counts, [2, 1, 1, 2, 1]);

    assert!(store.get_subject(subject_id).await.unwrap().is_none());
    assert!(store.progress_for(subject_id).await.unwrap().is_empty());
    assert!(store.files_for(subject_id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn hard_on_missing_subject_is_not_found() {
    let (_store, engine) = fixture().await;
    let err = engine
      .erase(Uuid::new_v4(), ErasureMode::Hard)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::SubjectNotFound(_)));
  }

  #[tokio::test]
  async fn hard_steps_run_children_first() {
    let (inner, scripted) = ScriptedStore::wrap().await;
    let subject_id = seed_graph(&inner).await;

    let engine = ErasureEngine::new(scripted.clone());
    engine.erase(subject_id, ErasureMode::Hard).await.unwrap();

    let steps: Vec<_> = scripted
      .calls()
      .into_iter()
      .filter(|c| c.starts_with("erase_step:"))
      .collect();
    assert_eq!(
      steps,
      [
        "erase_step:files",
        "erase_step:revisions",
        "erase_step:sessions",
        "erase_step:progress",
        "erase_step:subject",
      ]
    );
  }

  #[tokio::test]
  async fn interrupted_hard_run_reports_progress_and_retries_clean() {
    let (inner, scripted) = ScriptedStore::wrap().await;
    let subject_id = seed_graph(&inner).await;
    scripted.fail_on("erase_step:sessions");

    let engine = ErasureEngine::new(scripted.clone());
    let err = engine
      .erase(subject_id, ErasureMode::Hard)
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      Error::ErasureIncomplete {
        mode: ErasureMode::Hard,
        ref completed,
        failed: ErasureStep::Sessions,
        ..
      } if completed == &[ErasureStep::Files, ErasureStep::Revisions]
    ));

    // The completed prefix stays deleted; the subject row is untouched.
    assert!(inner.get_subject(subject_id).await.unwrap().is_some());
    assert!(inner.files_for(subject_id).await.unwrap().is_empty());

    scripted.clear_failure();
    let result = engine.erase(subject_id, ErasureMode::Hard).await.unwrap();
    let files_step = result
      .affected
      .iter()
      .find(|r| r.step == ErasureStep::Files)
      .expect("files step");
    assert_eq!(files_step.affected, 0);
    assert!(inner.get_subject(subject_id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn anonymize_failure_reports_the_failed_step() {
    let (inner, scripted) = ScriptedStore::wrap().await;
    let subject_id = seed_graph(&inner).await;
    scripted.fail_on("detach_sessions");

    let engine = ErasureEngine::new(scripted.clone());
    let err = engine
      .erase(subject_id, ErasureMode::Anonymize)
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      Error::ErasureIncomplete {
        mode: ErasureMode::Anonymize,
        ref completed,
        failed: ErasureStep::Sessions,
        ..
      } if completed == &[ErasureStep::Subject]
    ));

    // The identity rewrite went through before the failure.
    let subject = inner.get_subject(subject_id).await.unwrap().unwrap();
    assert_eq!(subject.given_name, AnonymousIdentity::GIVEN_NAME);
  }
}
