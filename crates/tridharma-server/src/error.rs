//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] tridharma_core::Error),

  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("registration is closed")]
  RegistrationClosed,

  #[error("{0}")]
  BadRequest(String),

  #[error("multipart error: {0}")]
  Multipart(#[from] MultipartError),

  #[error("transfer error: {0}")]
  Transfer(#[from] tridharma_transfer::Error),

  #[error("token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error("password hash error: {0}")]
  PasswordHash(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("background task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

impl Error {
  /// Box a store error into the core taxonomy.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Core(tridharma_core::Error::store(err))
  }

  fn status(&self) -> StatusCode {
    use tridharma_core::Error as Core;
    use tridharma_transfer::Error as Transfer;

    match self {
      Error::Core(Core::Unauthenticated) | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
      Error::Core(Core::Forbidden) | Error::RegistrationClosed => StatusCode::FORBIDDEN,
      Error::Core(Core::NotFound(_)) => StatusCode::NOT_FOUND,
      Error::Core(Core::Validation(_)) | Error::BadRequest(_) | Error::Multipart(_) => {
        StatusCode::BAD_REQUEST
      }
      Error::Transfer(Transfer::Workbook(_) | Transfer::NoSheet) => StatusCode::BAD_REQUEST,
      Error::Core(Core::Store(_) | Core::Serialization(_))
      | Error::Transfer(_)
      | Error::Token(_)
      | Error::PasswordHash(_)
      | Error::Io(_)
      | Error::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
