//! Route handlers, one module per resource.
//!
//! | Method | Path | Module |
//! |--------|------|--------|
//! | `POST` | `/api/register`, `/api/login` | [`session`] |
//! | `GET`, `POST` | `/api/dosen` | [`dosen`] |
//! | `GET`, `POST` | `/api/kegiatan` | [`kegiatan`] |
//! | `POST` | `/api/import/excel` | [`transfer`] |
//! | `GET`  | `/api/export/excel`, `/api/export/pdf` | [`transfer`] |

pub mod dosen;
pub mod kegiatan;
pub mod session;
pub mod transfer;

use axum::{
  Json,
  extract::Multipart,
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{attachments::Upload, error::Error};

/// The `{"ok":true,"id":...}` body returned by create endpoints.
pub(crate) fn created(id: i64) -> Json<serde_json::Value> { Json(json!({ "ok": true, "id": id })) }

/// Read multipart fields until the one named `file`; other fields are
/// discarded.
pub(crate) async fn take_file_field(multipart: &mut Multipart) -> Result<Option<Upload>, Error> {
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some("file") {
      let file_name = field.file_name().map(str::to_owned);
      let bytes = field.bytes().await?;
      return Ok(Some(Upload { file_name, bytes }));
    }
  }
  Ok(None)
}

/// A binary download with a `Content-Disposition: attachment` header.
pub(crate) fn download(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
  let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
  (
    [
      (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    body,
  )
    .into_response()
}
