//! Actor-context extractor.
//!
//! Captures best-effort request metadata for audit entries: client IP
//! from `x-forwarded-for`, the user agent, and `x-request-id`. A missing
//! header is recorded as absent, never invented.

use axum::{extract::FromRequestParts, http::request::Parts};
use tutela_core::audit::ActorContext;

/// Present in a handler signature, yields the request's [`ActorContext`].
/// Never rejects.
pub struct Actor(pub ActorContext);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let header = |name: &str| {
      parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
    };

    // The first hop listed in x-forwarded-for is the client.
    let ip = header("x-forwarded-for")
      .and_then(|v| v.split(',').next().map(|h| h.trim().to_owned()))
      .filter(|h| !h.is_empty());

    Ok(Actor(ActorContext {
      ip,
      user_agent: header("user-agent"),
      request_id: header("x-request-id"),
    }))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::Request;

  use super::*;

  async fn extract(request: Request<()>) -> ActorContext {
    let (mut parts, ()) = request.into_parts();
    let Actor(actor) = Actor::from_request_parts(&mut parts, &())
      .await
      .unwrap();
    actor
  }

  #[tokio::test]
  async fn captures_all_three_headers() {
    let request = Request::builder()
      .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
      .header("user-agent", "curl/8.5")
      .header("x-request-id", "req-42")
      .body(())
      .unwrap();

    let actor = extract(request).await;
    assert_eq!(actor.ip.as_deref(), Some("203.0.113.9"));
    assert_eq!(actor.user_agent.as_deref(), Some("curl/8.5"));
    assert_eq!(actor.request_id.as_deref(), Some("req-42"));
  }

  #[tokio::test]
  async fn missing_headers_stay_absent() {
    let actor = extract(Request::builder().body(()).unwrap()).await;
    assert!(actor.ip.is_none());
    assert!(actor.user_agent.is_none());
    assert!(actor.request_id.is_none());
  }
}
