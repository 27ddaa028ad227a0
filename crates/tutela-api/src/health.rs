//! The `/health` endpoint.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use tutela_core::store::LifecycleStore;
use tutela_lifecycle::{LifecycleCoordinator, coordinator::ComponentHealth};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
  pub status:     &'static str,
  pub components: Components,
}

#[derive(Debug, Serialize)]
pub struct Components {
  pub consent_ledger: ComponentHealth,
  pub erasure:        ComponentHealth,
  pub audit_trail:    ComponentHealth,
}

/// `GET /health` — 200 `"ok"` when every component is up, 503 `"degraded"`
/// otherwise. Always returns a body so operators can see which component
/// is down.
pub async fn health<S>(
  State(coordinator): State<Arc<LifecycleCoordinator<S>>>,
) -> impl IntoResponse
where
  S: LifecycleStore + Clone + 'static,
{
  let report = coordinator.health().await;
  let code = if report.healthy {
    StatusCode::OK
  } else {
    StatusCode::SERVICE_UNAVAILABLE
  };
  let body = HealthResponse {
    status:     if report.healthy { "ok" } else { "degraded" },
    components: Components {
      consent_ledger: report.consent_ledger,
      erasure:        report.erasure,
      audit_trail:    report.audit_trail,
    },
  };
  (code, Json(body))
}
