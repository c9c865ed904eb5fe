//! ETag computation for activity listings.
//!
//! Rows are append-only, so a listing is identified by the ids and creation
//! times of the rows it contains.

use sha2::{Digest, Sha256};
use tridharma_core::activity::ActivityRecord;

/// Compute a quoted strong ETag over `records`, in listing order.
pub fn compute_etag(records: &[ActivityRecord]) -> String {
  let mut hasher = Sha256::new();
  hasher.update((records.len() as u64).to_le_bytes());
  for record in records {
    hasher.update(record.id.to_le_bytes());
    hasher.update(record.created_at.timestamp_micros().to_le_bytes());
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether an `If-None-Match` header value names `etag`.
///
/// Accepts a comma-separated list, `*`, weak validators, and ETags with or
/// without surrounding quotes.
pub fn if_none_match_hits(header: &str, etag: &str) -> bool {
  let want = etag.trim_matches('"');
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || candidate.trim_start_matches("W/").trim_matches('"') == want
  })
}
