//! Handlers for `/api/kegiatan`.

use axum::{
  Json,
  extract::{FromRequest, Multipart, Request, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tridharma_core::store::RecordStore;

use crate::{
  AppState,
  attachments::Upload,
  auth::Authenticated,
  error::Error,
  etag::{compute_etag, if_none_match_hits},
  handlers::created,
};

/// `GET /api/kegiatan` — the caller's visible activities, newest first.
///
/// Carries an `ETag`; a matching `If-None-Match` yields `304 Not Modified`.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  headers: HeaderMap,
) -> Result<Response, Error>
where
  S: RecordStore + Clone + 'static,
{
  let records = state.access.list_activities(&identity).await?;
  let etag = compute_etag(&records);

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match_hits(v, &etag));

  if not_modified {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }
  Ok(([(header::ETAG, etag)], Json(records)).into_response())
}

/// `POST /api/kegiatan` — JSON body, or multipart form with at most one
/// `file` part.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  form: ActivityForm,
) -> Result<Json<Value>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let attachment_path = match &form.file {
    Some(upload) => Some(state.attachments.store(upload).await?),
    None => None,
  };
  let result = state
    .access
    .create_activity(&identity, form.body, attachment_path.clone())
    .await;

  // No row references the file unless the insert succeeded.
  if result.is_err()
    && let Some(path) = &attachment_path
  {
    state.attachments.discard(path).await;
  }
  Ok(created(result?.id))
}

/// An activity submission: every non-file field becomes part of `body`.
///
/// Multipart text fields arrive as JSON strings; a JSON request body is taken
/// as-is.
pub struct ActivityForm {
  pub body: Value,
  pub file: Option<Upload>,
}

impl<S> FromRequest<S> for ActivityForm
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let is_multipart = req
      .headers()
      .get(header::CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
      let Json(body) = Json::<Value>::from_request(req, state)
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?;
      return Ok(Self { body, file: None });
    }

    let mut multipart = Multipart::from_request(req, state)
      .await
      .map_err(|e| Error::BadRequest(e.body_text()))?;

    let mut fields = Map::new();
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
      let Some(name) = field.name().map(str::to_owned) else {
        continue;
      };
      if name == "file" {
        if file.is_some() {
          return Err(Error::BadRequest("only one `file` part is allowed".into()));
        }
        let file_name = field.file_name().map(str::to_owned);
        file = Some(Upload { file_name, bytes: field.bytes().await? });
      } else {
        fields.insert(name, Value::String(field.text().await?));
      }
    }
    Ok(Self { body: Value::Object(fields), file })
  }
}
