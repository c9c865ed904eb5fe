//! HTTP layer for Tridharma.
//!
//! Exposes an axum [`Router`] serving the JSON API over any
//! [`RecordStore`]. Every scoped resource goes through the
//! [`AccessLayer`]; handlers only translate HTTP to identity + input and back.

pub mod attachments;
pub mod auth;
pub mod error;
pub mod etag;
pub mod handlers;
pub mod token;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tridharma_core::{access::AccessLayer, store::RecordStore};
use tridharma_transfer::pdf::ChromiumPdf;

use attachments::{LocalAttachments, PUBLIC_PREFIX};
use handlers::{dosen, kegiatan, session, transfer};
use token::TokenIssuer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TRIDHARMA_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// HMAC secret for session tokens. Required to serve.
  #[serde(default)]
  pub jwt_secret:         String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours:    i64,
  #[serde(default = "default_upload_dir")]
  pub upload_dir:         PathBuf,
  /// Maximum request body size, which bounds attachment and import uploads.
  #[serde(default = "default_upload_limit_bytes")]
  pub upload_limit_bytes: usize,
  #[serde(default = "default_chromium_path")]
  pub chromium_path:      PathBuf,
  /// Whether `POST /api/register` accepts new accounts.
  #[serde(default = "default_open_registration")]
  pub open_registration:  bool,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 4000 }
fn default_store_path() -> PathBuf { PathBuf::from("tridharma.db") }
fn default_token_ttl_hours() -> i64 { token::DEFAULT_TTL_HOURS }
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_upload_limit_bytes() -> usize { 10 * 1024 * 1024 }
fn default_chromium_path() -> PathBuf { PathBuf::from("chromium") }
fn default_open_registration() -> bool { true }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub access:      AccessLayer<S>,
  pub tokens:      Arc<TokenIssuer>,
  pub attachments: Arc<LocalAttachments>,
  pub pdf:         Arc<ChromiumPdf>,
  pub config:      Arc<ServerConfig>,
}

impl<S: RecordStore> AppState<S> {
  /// Wire the collaborators described by `config` around `store`.
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let ttl = chrono::Duration::hours(config.token_ttl_hours);
    Self {
      access:      AccessLayer::new(store),
      tokens:      Arc::new(TokenIssuer::new(config.jwt_secret.as_bytes(), ttl)),
      attachments: Arc::new(LocalAttachments::new(&config.upload_dir)),
      pdf:         Arc::new(ChromiumPdf::new(
        &config.chromium_path,
        std::env::temp_dir().join("tridharma-pdf"),
      )),
      config:      Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the API and the uploaded files.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + 'static,
{
  let uploads = ServeDir::new(state.attachments.dir());
  let body_limit = state.config.upload_limit_bytes;

  Router::new()
    .route("/api/register",     post(session::register::<S>))
    .route("/api/login",        post(session::login::<S>))
    .route("/api/dosen",        get(dosen::list::<S>).post(dosen::create::<S>))
    .route("/api/kegiatan",     get(kegiatan::list::<S>).post(kegiatan::create::<S>))
    .route("/api/import/excel", post(transfer::import_excel::<S>))
    .route("/api/export/excel", get(transfer::export_excel::<S>))
    .route("/api/export/pdf",   get(transfer::export_pdf::<S>))
    .nest_service(PUBLIC_PREFIX, uploads)
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
