//! Session tokens: HS256 JWTs carrying the caller's [`Identity`].
//!
//! Tokens are valid for a fixed window (8 hours by default). There is no
//! refresh or revocation; expiry is the only way a token stops working.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tridharma_core::identity::Identity;

use crate::error::Error;

/// Default validity window of an issued token.
pub const DEFAULT_TTL_HOURS: i64 = 8;

/// The claim set: identity fields at the top level plus `iat`/`exp`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  #[serde(flatten)]
  pub identity: Identity,
  pub iat:      i64,
  pub exp:      i64,
}

/// Issues and verifies session tokens with a shared secret.
pub struct TokenIssuer {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl TokenIssuer {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      ttl,
    }
  }

  pub fn issue(&self, identity: &Identity) -> Result<String, Error> {
    let now = Utc::now();
    self.encode(&Claims {
      identity: identity.clone(),
      iat:      now.timestamp(),
      exp:      (now + self.ttl).timestamp(),
    })
  }

  fn encode(&self, claims: &Claims) -> Result<String, Error> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
  }

  /// Verify signature and expiry. Every failure is `Unauthenticated`.
  pub fn verify(&self, token: &str) -> Result<Identity, tridharma_core::Error> {
    decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims.identity)
      .map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        tridharma_core::Error::Unauthenticated
      })
  }
}
