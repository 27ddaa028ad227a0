//! The consent ledger — issues, verifies, completes, and sweeps consent
//! requests.
//!
//! This is the only component that mutates consent rows. Every rejection
//! collapses into the cause-free [`Error::ConsentInvalid`]; the specific
//! cause is visible at DEBUG level only, so callers cannot probe which
//! tokens exist.

use chrono::{TimeDelta, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use tutela_core::{
  Error, Result,
  consent::{ConsentKind, ConsentRequest, ConsentStatus, NewConsentRequest},
  store::LifecycleStore,
};

use crate::token;

/// Default lifetime of a consent request, in days.
pub const DEFAULT_TTL_DAYS: i64 = 30;

/// Issues and verifies the time-boxed authorizations behind every
/// consent-gated operation.
pub struct ConsentLedger<S> {
  store: S,
  ttl:   TimeDelta,
}

impl<S: LifecycleStore> ConsentLedger<S> {
  pub fn new(store: S) -> Self {
    Self::with_ttl(store, TimeDelta::days(DEFAULT_TTL_DAYS))
  }

  pub fn with_ttl(store: S, ttl: TimeDelta) -> Self {
    Self { store, ttl }
  }

  /// Issue a new consent request for an existing subject. The returned
  /// record is the only place the token ever leaves the subsystem; it is
  /// never logged.
  pub async fn submit(&self, input: NewConsentRequest) -> Result<ConsentRequest> {
    if self
      .store
      .get_subject(input.subject_id)
      .await
      .map_err(Error::storage)?
      .is_none()
    {
      return Err(Error::InvalidSubject(input.subject_id));
    }

    let now = Utc::now();
    let request = ConsentRequest {
      request_id:    Uuid::new_v4(),
      subject_id:    input.subject_id,
      kind:          input.kind,
      token:         token::generate_token(),
      status:        ConsentStatus::Pending,
      contact_email: input.contact_email,
      details:       input.details,
      created_at:    now,
      expires_at:    now + self.ttl,
    };
    self
      .store
      .insert_consent(request.clone())
      .await
      .map_err(Error::storage)?;

    info!(
      request_id = %request.request_id,
      subject_id = %request.subject_id,
      kind = request.kind.as_str(),
      "consent request submitted"
    );
    Ok(request)
  }

  /// Fetch by token and run every authorization check without changing
  /// the row. All failures collapse to [`Error::ConsentInvalid`].
  async fn inspect(&self, token: &str) -> Result<ConsentRequest> {
    let Some(request) = self
      .store
      .consent_by_token(token)
      .await
      .map_err(Error::storage)?
    else {
      debug!("consent rejected: unknown token");
      return Err(Error::ConsentInvalid);
    };

    // The row was selected by exact match already; comparing digests on
    // top keeps the check's cost independent of the input.
    if !token::digests_match(token, &request.token) {
      debug!(request_id = %request.request_id, "consent rejected: token mismatch");
      return Err(Error::ConsentInvalid);
    }

    let now = Utc::now();
    if request.is_expired(now) {
      debug!(request_id = %request.request_id, "consent rejected: expired");
      return Err(Error::ConsentInvalid);
    }
    if request.status == ConsentStatus::Completed {
      debug!(request_id = %request.request_id, "consent rejected: already completed");
      return Err(Error::ConsentInvalid);
    }
    Ok(request)
  }

  /// Move a checked request to `Verified`. Re-promoting a verified row
  /// is a no-op, so repeated verification of a live token succeeds.
  async fn promote(&self, request: &ConsentRequest) -> Result<()> {
    if request.status == ConsentStatus::Pending {
      self
        .store
        .set_consent_status(request.request_id, ConsentStatus::Verified)
        .await
        .map_err(Error::storage)?;
    }
    Ok(())
  }

  /// Verify a bare token, promoting the request to `Verified`.
  pub async fn verify(&self, token: &str) -> Result<ConsentRequest> {
    let request = self.inspect(token).await?;
    self.promote(&request).await?;
    Ok(ConsentRequest { status: ConsentStatus::Verified, ..request })
  }

  /// Verify a token as authorization for one operation on one subject.
  /// The binding checks run before any state change, so a mismatched
  /// attempt leaves the request untouched and replayable by its real
  /// owner.
  pub async fn verify_for(
    &self,
    token:      &str,
    subject_id: Uuid,
    allowed:    &[ConsentKind],
  ) -> Result<ConsentRequest> {
    let request = self.inspect(token).await?;
    if request.subject_id != subject_id {
      debug!(request_id = %request.request_id, "consent rejected: subject mismatch");
      return Err(Error::ConsentInvalid);
    }
    if !allowed.contains(&request.kind) {
      debug!(
        request_id = %request.request_id,
        kind = request.kind.as_str(),
        "consent rejected: kind not valid for this operation"
      );
      return Err(Error::ConsentInvalid);
    }
    self.promote(&request).await?;
    Ok(ConsentRequest { status: ConsentStatus::Verified, ..request })
  }

  /// Close out a spent request. Idempotent; completing a request that
  /// was already completed (or swept) changes nothing.
  pub async fn mark_completed(&self, request_id: Uuid) -> Result<()> {
    let matched = self
      .store
      .set_consent_status(request_id, ConsentStatus::Completed)
      .await
      .map_err(Error::storage)?;
    if !matched {
      debug!(%request_id, "completion target no longer exists");
    }
    Ok(())
  }

  /// Delete expired `pending` requests. Verified and completed rows are
  /// kept as evidence of the consent that was given.
  pub async fn sweep_expired(&self) -> Result<u64> {
    let swept = self
      .store
      .sweep_expired_consents(Utc::now())
      .await
      .map_err(Error::storage)?;
    if swept > 0 {
      info!(swept, "expired consent requests swept");
    }
    Ok(swept)
  }
}
