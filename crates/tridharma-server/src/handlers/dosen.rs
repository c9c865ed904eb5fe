//! Handlers for `/api/dosen`.

use axum::{Json, extract::State};
use serde_json::Value;
use tridharma_core::{
  faculty::{FacultyRecord, NewFaculty},
  store::RecordStore,
};

use crate::{AppState, auth::Authenticated, error::Error, handlers::created};

/// `GET /api/dosen` — faculty visible to the caller.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
) -> Result<Json<Vec<FacultyRecord>>, Error>
where
  S: RecordStore + Clone + 'static,
{
  Ok(Json(state.access.list_faculty(&identity).await?))
}

/// `POST /api/dosen` — body `{"name","prodi","nidn"}`; admins only.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  Json(body): Json<NewFaculty>,
) -> Result<Json<Value>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let id = state.access.create_faculty(&identity, body).await?;
  Ok(created(id))
}
