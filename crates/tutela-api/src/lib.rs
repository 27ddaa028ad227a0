//! JSON REST API for Tutela.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tutela_core::store::LifecycleStore`] through a
//! [`LifecycleCoordinator`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tutela_api::api_router(coordinator.clone()))
//! ```

pub mod actor;
pub mod consents;
pub mod error;
pub mod health;
pub mod subjects;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post},
};
use chrono::TimeDelta;
use serde::Deserialize;
use tutela_core::store::LifecycleStore;
use tutela_lifecycle::{
  CoordinatorConfig, LifecycleCoordinator, consent::DEFAULT_TTL_DAYS,
};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `TUTELA_*` environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  #[serde(default = "default_port")]
  pub port:                    u16,
  pub store_path:              PathBuf,
  /// Lifetime of newly submitted consent requests, in days.
  #[serde(default = "default_consent_ttl_days")]
  pub consent_ttl_days:        i64,
  /// Interval between consent expiry sweeps, in seconds.
  #[serde(default = "default_sweep_interval_secs")]
  pub sweep_interval_secs:     u64,
  /// Serve exports without a consent token. Leave off unless an outer
  /// layer authenticates callers.
  #[serde(default)]
  pub allow_unverified_export: bool,
  #[serde(default = "default_operation_timeout_secs")]
  pub operation_timeout_secs:  u64,
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}
fn default_port() -> u16 {
  8080
}
fn default_consent_ttl_days() -> i64 {
  DEFAULT_TTL_DAYS
}
fn default_sweep_interval_secs() -> u64 {
  3_600
}
fn default_operation_timeout_secs() -> u64 {
  30
}

impl ServerConfig {
  /// The coordinator policy this configuration asks for.
  pub fn coordinator_config(&self) -> CoordinatorConfig {
    CoordinatorConfig {
      operation_timeout:       Duration::from_secs(self.operation_timeout_secs),
      allow_unverified_export: self.allow_unverified_export,
      consent_ttl:             TimeDelta::days(self.consent_ttl_days),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `coordinator`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(coordinator: Arc<LifecycleCoordinator<S>>) -> Router<()>
where
  S: LifecycleStore + Clone + 'static,
{
  Router::new()
    // Consents
    .route("/consents", post(consents::submit::<S>))
    .route("/consents/verify", post(consents::verify::<S>))
    // Subjects
    .route("/subjects/{id}", delete(subjects::erase::<S>))
    .route("/subjects/{id}/export", get(subjects::export::<S>))
    .route("/subjects/{id}/audit", get(subjects::audit::<S>))
    // Health
    .route("/health", get(health::health::<S>))
    .with_state(coordinator)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::NaiveDate;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use tutela_core::{
    records::{NewProgress, NewSession},
    subject::{AnonymousIdentity, NewSubject},
  };
  use tutela_store_sqlite::SqliteStore;
  use uuid::Uuid;

  async fn make_coordinator(
    config: CoordinatorConfig,
  ) -> (SqliteStore, Arc<LifecycleCoordinator<SqliteStore>>) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let coordinator = Arc::new(LifecycleCoordinator::new(store.clone(), config));
    (store, coordinator)
  }

  async fn seed_subject(store: &SqliteStore) -> Uuid {
    let birth = NaiveDate::from_ymd_opt(2013, 3, 9).unwrap();
    let subject_id = store
      .add_subject(NewSubject::new("Ada", "Byron", birth))
      .await
      .unwrap()
      .subject_id;
    store
      .record_progress(NewProgress {
        subject_id,
        exercise: "fractions-2".to_owned(),
        attempts: 4,
        correct: 3,
      })
      .await
      .unwrap();
    store
      .record_session(NewSession {
        subject_id,
        client: Some("web".to_owned()),
      })
      .await
      .unwrap();
    subject_id
  }

  async fn oneshot(
    coordinator: Arc<LifecycleCoordinator<SqliteStore>>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    api_router(coordinator).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  /// Issue a consent request over the API and return its token.
  async fn issue_token(
    coordinator: &Arc<LifecycleCoordinator<SqliteStore>>,
    subject_id: Uuid,
    request_type: &str,
  ) -> String {
    let resp = oneshot(
      coordinator.clone(),
      "POST",
      "/consents",
      Some(json!({
        "subject_id": subject_id,
        "request_type": request_type,
        "contact_email": "guardian@example.org",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["token"].as_str().unwrap().to_owned()
  }

  // ── Consents ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn consent_flow_issues_and_verifies_a_token() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let subject_id = seed_subject(&store).await;

    let resp = oneshot(
      coordinator.clone(),
      "POST",
      "/consents",
      Some(json!({
        "subject_id": subject_id,
        "request_type": "data_access",
        "contact_email": "guardian@example.org",
        "details": "annual review",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let submitted = json_body(resp).await;
    assert_eq!(submitted["status"], "pending");
    let token = submitted["token"].as_str().unwrap().to_owned();
    assert_eq!(token.len(), 64);

    let resp = oneshot(
      coordinator.clone(),
      "POST",
      "/consents/verify",
      Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let verified = json_body(resp).await;
    assert_eq!(verified["status"], "verified");
    assert_eq!(verified["request_type"], "data_access");
    assert_eq!(verified["subject_id"], json!(subject_id));
    assert_eq!(verified["request_id"], submitted["request_id"]);
    // The token travels to the caller exactly once, at submission.
    assert!(verified.get("token").is_none());
  }

  #[tokio::test]
  async fn verifying_an_unknown_token_is_404() {
    let (_store, coordinator) =
      make_coordinator(CoordinatorConfig::default()).await;
    let resp = oneshot(
      coordinator,
      "POST",
      "/consents/verify",
      Some(json!({ "token": "0".repeat(64) })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"], "consent request not found");
  }

  #[tokio::test]
  async fn consents_for_unknown_subjects_are_404() {
    let (_store, coordinator) =
      make_coordinator(CoordinatorConfig::default()).await;
    let resp = oneshot(
      coordinator,
      "POST",
      "/consents",
      Some(json!({
        "subject_id": Uuid::new_v4(),
        "request_type": "data_deletion",
        "contact_email": "guardian@example.org",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn malformed_bodies_are_422() {
    let (_store, coordinator) =
      make_coordinator(CoordinatorConfig::default()).await;
    let resp = oneshot(
      coordinator,
      "POST",
      "/consents",
      Some(json!({ "subject_id": "not-a-uuid" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  // ── Export ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn export_downloads_a_json_attachment() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let subject_id = seed_subject(&store).await;
    let token = issue_token(&coordinator, subject_id, "data_access").await;

    let resp = oneshot(
      coordinator,
      "GET",
      &format!("/subjects/{subject_id}/export?token={token}"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get(header::CONTENT_TYPE).unwrap(),
      "application/json"
    );
    assert_eq!(
      resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
      &format!("attachment; filename=\"subject_{subject_id}_data.json\"")
    );

    let bundle = json_body(resp).await;
    assert_eq!(bundle["subject"]["subject_id"], json!(subject_id));
    assert_eq!(bundle["progress"].as_array().unwrap().len(), 1);
    assert_eq!(bundle["data_types"].as_array().unwrap().len(), 5);
  }

  #[tokio::test]
  async fn csv_exports_flatten_the_bundle() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let subject_id = seed_subject(&store).await;
    let token = issue_token(&coordinator, subject_id, "data_portability").await;

    let resp = oneshot(
      coordinator,
      "GET",
      &format!("/subjects/{subject_id}/export?format=csv&token={token}"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "text/csv");
    assert_eq!(
      resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
      &format!("attachment; filename=\"subject_{subject_id}_data.csv\"")
    );

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let csv = std::str::from_utf8(&bytes).unwrap();
    assert!(csv.starts_with("table,path,value\r\n"), "header missing: {csv}");
    assert!(csv.contains("subject,given_name,Ada"), "subject row missing");
    assert!(
      csv.contains("progress,record_0.exercise,fractions-2"),
      "progress row missing"
    );
  }

  #[tokio::test]
  async fn exports_without_consent_are_403() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let subject_id = seed_subject(&store).await;

    let resp = oneshot(
      coordinator,
      "GET",
      &format!("/subjects/{subject_id}/export"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn export_tokens_do_not_transfer_between_subjects() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let alice = seed_subject(&store).await;
    let bob = seed_subject(&store).await;
    let token = issue_token(&coordinator, alice, "data_access").await;

    let resp = oneshot(
      coordinator,
      "GET",
      &format!("/subjects/{bob}/export?token={token}"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Erasure ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_anonymize_rewrites_identity_and_reports_counts() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let subject_id = seed_subject(&store).await;
    let token = issue_token(&coordinator, subject_id, "data_deletion").await;

    let resp = oneshot(
      coordinator,
      "DELETE",
      &format!("/subjects/{subject_id}"),
      Some(json!({ "token": token, "mode": "ANONYMIZE" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["mode"], "anonymize");
    assert!(body["affected_records"].as_u64().unwrap() >= 1);
    assert_eq!(body["affected"].as_array().unwrap().len(), 3);
    assert!(body["deleted_at"].is_string());

    let subject = store.get_subject(subject_id).await.unwrap().unwrap();
    assert_eq!(subject.given_name, AnonymousIdentity::GIVEN_NAME);
  }

  #[tokio::test]
  async fn delete_hard_removes_the_subject_and_spends_the_token() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let subject_id = seed_subject(&store).await;
    let token = issue_token(&coordinator, subject_id, "data_deletion").await;

    let resp = oneshot(
      coordinator.clone(),
      "DELETE",
      &format!("/subjects/{subject_id}"),
      Some(json!({ "token": token, "mode": "HARD" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["affected"].as_array().unwrap().len(), 5);
    assert!(store.get_subject(subject_id).await.unwrap().is_none());

    // Replaying the spent token gets a flat 403.
    let resp = oneshot(
      coordinator,
      "DELETE",
      &format!("/subjects/{subject_id}"),
      Some(json!({ "token": token, "mode": "HARD" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn unknown_erasure_modes_are_422() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig::default()).await;
    let subject_id = seed_subject(&store).await;

    let resp = oneshot(
      coordinator,
      "DELETE",
      &format!("/subjects/{subject_id}"),
      Some(json!({ "token": "0".repeat(64), "mode": "PURGE" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  // ── Audit log ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn audit_log_pages_and_counts() {
    let (store, coordinator) = make_coordinator(CoordinatorConfig {
      allow_unverified_export: true,
      ..CoordinatorConfig::default()
    })
    .await;
    let subject_id = seed_subject(&store).await;
    for _ in 0..3 {
      let resp = oneshot(
        coordinator.clone(),
        "GET",
        &format!("/subjects/{subject_id}/export"),
        None,
      )
      .await;
      assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = oneshot(
      coordinator.clone(),
      "GET",
      &format!("/subjects/{subject_id}/audit?limit=2"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"], json!({ "limit": 2, "offset": 0, "total": 3 }));

    // Filtering on an action none of the entries carry.
    let resp = oneshot(
      coordinator,
      "GET",
      &format!("/subjects/{subject_id}/audit?action=delete"),
      None,
    )
    .await;
    let body = json_body(resp).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 0);
  }

  // ── Health ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_ok_on_a_fresh_store() {
    let (_store, coordinator) =
      make_coordinator(CoordinatorConfig::default()).await;
    let resp = oneshot(coordinator, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["audit_trail"]["detail"], "empty trail");
  }
}
