//! Handlers for `/subjects/{id}` endpoints — export, erasure, audit log.
//!
//! | Method | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects/{id}/export` | `?format=json\|csv`, `?token=...`; returns a download |
//! | `DELETE` | `/subjects/{id}` | Body: [`EraseBody`]; mode `SOFT`/`ANONYMIZE`/`HARD` |
//! | `GET`    | `/subjects/{id}/audit` | `?limit=...&offset=...&action=...` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutela_core::{
  audit::{AuditAction, AuditLogEntry, AuditQuery},
  erasure::{ErasureMode, ErasureResult, StepReport},
  export::{ExportBundle, ExportFormat},
  store::LifecycleStore,
};
use tutela_lifecycle::LifecycleCoordinator;
use uuid::Uuid;

use crate::{actor::Actor, error::ApiError};

// ─── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  /// Serialization of the bundle. Defaults to JSON.
  #[serde(default)]
  pub format: ExportFormat,
  /// Verified-consent token. May be omitted only on servers running with
  /// `allow_unverified_export`.
  pub token:  Option<String>,
}

/// `GET /subjects/{id}/export?format=csv&token=...`
pub async fn export<S>(
  State(coordinator): State<Arc<LifecycleCoordinator<S>>>,
  Path(subject_id): Path<Uuid>,
  Query(params): Query<ExportParams>,
  Actor(actor): Actor,
) -> Result<impl IntoResponse, ApiError>
where
  S: LifecycleStore + Clone + 'static,
{
  let bundle = coordinator
    .request_export(subject_id, params.token.as_deref(), params.format, actor)
    .await?;
  render_bundle(subject_id, params.format, &bundle)
}

/// Serialize the bundle in the requested format, wrapped as an attachment
/// named `subject_<id>_data.<ext>`.
fn render_bundle(
  subject_id: Uuid,
  format: ExportFormat,
  bundle: &ExportBundle,
) -> Result<impl IntoResponse + use<>, ApiError> {
  let (content_type, body) = match format {
    ExportFormat::Json => (
      "application/json",
      serde_json::to_vec_pretty(bundle)
        .map_err(|e| ApiError::Render(e.to_string()))?,
    ),
    ExportFormat::Csv => {
      let rows = tutela_tabular::flatten(bundle)
        .map_err(|e| ApiError::Render(e.to_string()))?;
      ("text/csv", tutela_tabular::to_csv(&rows).into_bytes())
    }
  };
  let disposition = format!(
    "attachment; filename=\"subject_{subject_id}_data.{}\"",
    format.extension(),
  );
  Ok((
    [
      (header::CONTENT_TYPE, content_type.to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    body,
  ))
}

// ─── Erase ────────────────────────────────────────────────────────────────────

/// Erasure mode as the wire spells it.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErasureModeParam {
  Soft,
  Anonymize,
  Hard,
}

impl From<ErasureModeParam> for ErasureMode {
  fn from(p: ErasureModeParam) -> Self {
    match p {
      ErasureModeParam::Soft => ErasureMode::Soft,
      ErasureModeParam::Anonymize => ErasureMode::Anonymize,
      ErasureModeParam::Hard => ErasureMode::Hard,
    }
  }
}

/// JSON body accepted by `DELETE /subjects/{id}`.
#[derive(Debug, Deserialize)]
pub struct EraseBody {
  pub token: String,
  /// `SOFT`, `ANONYMIZE`, or `HARD`.
  pub mode:  ErasureModeParam,
}

#[derive(Debug, Serialize)]
pub struct EraseResponse {
  pub mode:             ErasureMode,
  pub deleted_at:       DateTime<Utc>,
  pub affected_records: u64,
  pub affected:         Vec<StepReport>,
}

impl From<ErasureResult> for EraseResponse {
  fn from(r: ErasureResult) -> Self {
    Self {
      mode:             r.mode,
      deleted_at:       r.erased_at,
      affected_records: r.total_affected(),
      affected:         r.affected,
    }
  }
}

/// `DELETE /subjects/{id}` — body: `{"token":"...","mode":"ANONYMIZE"}`.
pub async fn erase<S>(
  State(coordinator): State<Arc<LifecycleCoordinator<S>>>,
  Path(subject_id): Path<Uuid>,
  Actor(actor): Actor,
  Json(body): Json<EraseBody>,
) -> Result<Json<EraseResponse>, ApiError>
where
  S: LifecycleStore + Clone + 'static,
{
  let result = coordinator
    .request_erasure(subject_id, &body.token, body.mode.into(), actor)
    .await?;
  Ok(Json(EraseResponse::from(result)))
}

// ─── Audit log ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuditParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
  /// Restrict to one action, e.g. `export` or `delete`.
  pub action: Option<AuditAction>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
  pub limit:  usize,
  pub offset: usize,
  /// Matching entries in total, ignoring `limit`/`offset`.
  pub total:  u64,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
  pub entries:    Vec<AuditLogEntry>,
  pub pagination: Pagination,
}

/// `GET /subjects/{id}/audit?limit=50&offset=0&action=export`
pub async fn audit<S>(
  State(coordinator): State<Arc<LifecycleCoordinator<S>>>,
  Path(subject_id): Path<Uuid>,
  Query(params): Query<AuditParams>,
) -> Result<Json<AuditResponse>, ApiError>
where
  S: LifecycleStore + Clone + 'static,
{
  let query = AuditQuery {
    action: params.action,
    limit:  params.limit,
    offset: params.offset,
    ..AuditQuery::default()
  };
  let (entries, total) = coordinator.audit_log(subject_id, &query).await?;
  Ok(Json(AuditResponse {
    entries,
    pagination: Pagination {
      limit:  params.limit.unwrap_or(AuditQuery::DEFAULT_LIMIT),
      offset: params.offset.unwrap_or(0),
      total,
    },
  }))
}
