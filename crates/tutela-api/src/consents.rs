//! Handlers for `/consents` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/consents` | Body: [`SubmitBody`]; returns 201 + [`SubmitResponse`] |
//! | `POST` | `/consents/verify` | Body: [`VerifyBody`]; promotes the request |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutela_core::{
  Error as LifecycleError,
  consent::{ConsentKind, ConsentRequest, ConsentStatus, NewConsentRequest},
  store::LifecycleStore,
};
use tutela_lifecycle::LifecycleCoordinator;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /consents`.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub subject_id:    Uuid,
  /// Which lifecycle operation the request should authorize.
  pub request_type:  ConsentKind,
  pub contact_email: String,
  pub details:       Option<String>,
}

/// The only response that ever carries the token.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  pub request_id: Uuid,
  pub token:      String,
  pub status:     ConsentStatus,
  pub expires_at: DateTime<Utc>,
}

impl From<ConsentRequest> for SubmitResponse {
  fn from(r: ConsentRequest) -> Self {
    Self {
      request_id: r.request_id,
      token:      r.token,
      status:     r.status,
      expires_at: r.expires_at,
    }
  }
}

/// `POST /consents` — returns 201 + the issued request and its token.
pub async fn submit<S>(
  State(coordinator): State<Arc<LifecycleCoordinator<S>>>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: LifecycleStore + Clone + 'static,
{
  if body.contact_email.trim().is_empty() {
    return Err(ApiError::BadRequest(
      "contact_email must not be empty".to_owned(),
    ));
  }
  let request = coordinator
    .submit_consent(NewConsentRequest {
      subject_id:    body.subject_id,
      kind:          body.request_type,
      contact_email: body.contact_email,
      details:       body.details,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(SubmitResponse::from(request))))
}

// ─── Verify ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub token: String,
}

/// What `POST /consents/verify` returns. Deliberately token-free; the
/// caller already holds the token and responses may pass through proxies
/// that log bodies.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
  pub request_id:   Uuid,
  pub subject_id:   Uuid,
  pub request_type: ConsentKind,
  pub status:       ConsentStatus,
  pub created_at:   DateTime<Utc>,
  pub expires_at:   DateTime<Utc>,
}

impl From<ConsentRequest> for VerifyResponse {
  fn from(r: ConsentRequest) -> Self {
    Self {
      request_id:   r.request_id,
      subject_id:   r.subject_id,
      request_type: r.kind,
      status:       r.status,
      created_at:   r.created_at,
      expires_at:   r.expires_at,
    }
  }
}

/// `POST /consents/verify` — body: `{"token":"..."}`.
///
/// Unknown, expired, and spent tokens all get the same 404, so the
/// endpoint cannot be used to probe which of those a guess hit.
pub async fn verify<S>(
  State(coordinator): State<Arc<LifecycleCoordinator<S>>>,
  Json(body): Json<VerifyBody>,
) -> Result<Json<VerifyResponse>, ApiError>
where
  S: LifecycleStore + Clone + 'static,
{
  let request =
    coordinator
      .verify_consent(&body.token)
      .await
      .map_err(|e| match e {
        LifecycleError::ConsentInvalid => {
          ApiError::NotFound("consent request not found".to_owned())
        }
        other => ApiError::from(other),
      })?;
  Ok(Json(VerifyResponse::from(request)))
}
