//! Registration and login.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tridharma_core::{
  identity::{Identity, Role},
  store::RecordStore,
  user::NewUser,
};

use crate::{
  AppState,
  auth::{hash_password, verify_password},
  error::Error,
  handlers::created,
};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub email:    String,
  pub password: String,
  pub role:     Role,
  pub prodi:    Option<String>,
  pub nidn:     Option<String>,
}

/// `POST /api/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<Json<Value>, Error>
where
  S: RecordStore + Clone + 'static,
{
  if !state.config.open_registration {
    return Err(Error::RegistrationClosed);
  }
  if body.email.trim().is_empty() || body.password.is_empty() {
    return Err(Error::BadRequest("email and password are required".into()));
  }

  let user = state
    .access
    .store()
    .create_user(NewUser {
      name:          body.name,
      email:         body.email,
      password_hash: hash_password(&body.password)?,
      role:          body.role,
      department:    body.prodi,
      identifier:    body.nidn,
    })
    .await
    .map_err(Error::store)?;

  tracing::info!(user_id = user.id, role = %user.role, "user registered");
  Ok(created(user.id))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /api/login` — returns `{"token": ..., "user": {...}}`.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Value>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let user = state
    .access
    .store()
    .find_user_by_email(&body.email)
    .await
    .map_err(Error::store)?
    .ok_or(Error::InvalidCredentials)?;

  if !verify_password(&body.password, &user.password_hash) {
    tracing::info!(user_id = user.id, "login rejected");
    return Err(Error::InvalidCredentials);
  }

  let identity = Identity::from(&user);
  let token = state.tokens.issue(&identity)?;
  tracing::info!(user_id = user.id, "login succeeded");
  Ok(Json(json!({ "token": token, "user": identity })))
}
