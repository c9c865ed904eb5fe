//! Spreadsheet import/export and PDF report handlers.

use axum::{
  Json,
  extract::{Multipart, State},
  response::Response,
};
use chrono::Utc;
use serde_json::{Value, json};
use tridharma_core::store::RecordStore;
use tridharma_transfer::{report::render_html, spreadsheet};

use crate::{
  AppState,
  auth::Authenticated,
  error::Error,
  handlers::{download, take_file_field},
};

const XLSX_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const REPORT_TITLE: &str = "Laporan Kegiatan";

/// `POST /api/import/excel` — multipart with a `file` part holding a
/// workbook. Every row of its first sheet becomes an activity owned by the
/// caller.
pub async fn import_excel<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  mut multipart: Multipart,
) -> Result<Json<Value>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let upload = take_file_field(&mut multipart)
    .await?
    .ok_or_else(|| Error::BadRequest("No file".into()))?;

  tracing::info!(
    file = upload.file_name.as_deref().unwrap_or("-"),
    bytes = upload.bytes.len(),
    "spreadsheet import started"
  );
  let rows =
    tokio::task::spawn_blocking(move || spreadsheet::read_rows(&upload.bytes)).await??;

  let report = state.access.bulk_import_activities(&identity, rows).await?;
  Ok(Json(json!({
    "ok":       report.failed.is_empty(),
    "imported": report.imported,
    "failed":   report.failed,
  })))
}

/// `GET /api/export/excel` — the caller's visible activities as `.xlsx`.
pub async fn export_excel<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
) -> Result<Response, Error>
where
  S: RecordStore + Clone + 'static,
{
  let rows = state.access.export_activities(&identity).await?;
  let count = rows.len();
  let bytes = tokio::task::spawn_blocking(move || spreadsheet::write_workbook(&rows)).await??;

  tracing::info!(rows = count, by = identity.id, "excel export");
  let file_name = format!("kegiatan_{}.xlsx", Utc::now().timestamp_millis());
  Ok(download(XLSX_CONTENT_TYPE, &file_name, bytes))
}

/// `GET /api/export/pdf` — the same rows as an A4 PDF report.
pub async fn export_pdf<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
) -> Result<Response, Error>
where
  S: RecordStore + Clone + 'static,
{
  let rows = state.access.export_activities(&identity).await?;
  let html = render_html(REPORT_TITLE, &rows);
  let bytes = state.pdf.render(&html).await?;

  tracing::info!(rows = rows.len(), by = identity.id, "pdf export");
  let file_name = format!("kegiatan_{}.pdf", Utc::now().timestamp_millis());
  Ok(download("application/pdf", &file_name, bytes))
}
