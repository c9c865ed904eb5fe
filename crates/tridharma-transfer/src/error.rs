//! Error types for the transfer adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("could not read workbook: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("workbook has no sheets")]
  NoSheet,

  #[error("could not write workbook: {0}")]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),

  #[error("pdf renderer failed: {0}")]
  Renderer(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
