//! Password hashing and the bearer-token extractor.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use rand_core::OsRng;
use tridharma_core::{identity::Identity, store::RecordStore};

use crate::{AppState, error::Error};

/// Hash `password` into an argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check `password` against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    tracing::warn!("stored password hash is not a valid PHC string");
    return false;
  };
  Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, tridharma_core::Error> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(tridharma_core::Error::Unauthenticated)?;

  let (scheme, token) = value
    .trim()
    .split_once(' ')
    .ok_or(tridharma_core::Error::Unauthenticated)?;

  if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
    return Err(tridharma_core::Error::Unauthenticated);
  }
  Ok(token.trim())
}

/// The verified caller. Present in a handler means the token checked out.
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: RecordStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let identity = state.tokens.verify(token)?;
    Ok(Authenticated(identity))
  }
}
