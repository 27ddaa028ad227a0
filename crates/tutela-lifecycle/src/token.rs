//! Consent-token generation and comparison.

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Random bytes behind each token; hex encoding doubles the length.
const TOKEN_BYTES: usize = 32;

/// Generate a fresh consent token from OS entropy: 64 lowercase hex
/// characters.
pub fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Compare a presented token against a stored one via SHA-256 digests,
/// so the comparison cost does not depend on where the inputs diverge.
pub(crate) fn digests_match(presented: &str, stored: &str) -> bool {
  Sha256::digest(presented.as_bytes()) == Sha256::digest(stored.as_bytes())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokens_are_fixed_width_lowercase_hex() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token
      .chars()
      .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }

  #[test]
  fn tokens_are_distinct() {
    assert_ne!(generate_token(), generate_token());
  }

  #[test]
  fn digest_comparison_tracks_string_equality() {
    let token = generate_token();
    assert!(digests_match(&token, &token));
    assert!(!digests_match(&token, &generate_token()));
    assert!(!digests_match(&token[..63], &token));
  }
}
