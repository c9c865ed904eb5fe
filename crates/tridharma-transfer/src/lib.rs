//! Bulk transfer adapters for Tridharma activity records.
//!
//! - [`spreadsheet::read_rows`] turns the first sheet of an uploaded workbook
//!   into JSON row objects keyed by the header row.
//! - [`spreadsheet::write_workbook`] writes [`ExportRow`]s to an `.xlsx`
//!   buffer.
//! - [`report::render_html`] and [`pdf::ChromiumPdf`] produce a printable A4
//!   report.
//!
//! Spreadsheet work is synchronous; callers on an async runtime should move it
//! onto a blocking thread.
//!
//! [`ExportRow`]: tridharma_core::activity::ExportRow

pub mod error;
pub mod pdf;
pub mod report;
pub mod spreadsheet;

pub use error::{Error, Result};
