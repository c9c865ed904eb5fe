//! Activity (kegiatan) records.
//!
//! An activity carries a small set of indexed columns used for scoping
//! (`type`, `prodi`, owner) plus an opaque JSON payload whose shape depends on
//! the activity type. The payload is stored and returned verbatim; nothing in
//! this crate validates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, identity::Identity};

/// Activity type used by spreadsheet imports when a row has none.
pub const DEFAULT_IMPORT_TYPE: &str = "penelitian";

/// A persisted activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
  pub id:              i64,
  #[serde(rename = "type")]
  pub kind:            String,
  #[serde(rename = "prodi")]
  pub department:      Option<String>,
  #[serde(rename = "user_name")]
  pub owner_name:      String,
  #[serde(rename = "user_id")]
  pub owner_id:        i64,
  /// The deserialised request body; `None` when nothing was stored.
  #[serde(rename = "data")]
  pub payload:         Option<Value>,
  #[serde(rename = "file_path")]
  pub attachment_path: Option<String>,
  pub created_at:      DateTime<Utc>,
}

impl ActivityRecord {
  /// Flatten into the row shape handed to tabular writers.
  pub fn to_export_row(&self) -> Result<ExportRow> {
    let data = self.payload.as_ref().map(serde_json::to_string).transpose()?;
    Ok(ExportRow {
      id: self.id,
      kind: self.kind.clone(),
      department: self.department.clone(),
      owner_name: self.owner_name.clone(),
      created_at: self.created_at.to_rfc3339(),
      data,
    })
  }
}

/// Input for [`crate::store::RecordStore::insert_activity`].
///
/// Owner fields and the timestamp are only ever filled from an [`Identity`]
/// via [`NewActivity::stamped`].
#[derive(Debug, Clone)]
pub struct NewActivity {
  pub kind:            String,
  pub department:      Option<String>,
  pub owner_name:      String,
  pub owner_id:        i64,
  pub payload:         Value,
  pub attachment_path: Option<String>,
  pub created_at:      DateTime<Utc>,
}

impl NewActivity {
  pub fn stamped(
    identity: &Identity,
    kind: String,
    department: Option<String>,
    payload: Value,
    attachment_path: Option<String>,
  ) -> Self {
    Self {
      kind,
      department,
      owner_name: identity.name.clone(),
      owner_id: identity.id,
      payload,
      attachment_path,
      created_at: Utc::now(),
    }
  }
}

/// One exported row: `{id, type, prodi, user_name, created_at, data}` with
/// the payload as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
  pub id:         i64,
  #[serde(rename = "type")]
  pub kind:       String,
  #[serde(rename = "prodi")]
  pub department: Option<String>,
  #[serde(rename = "user_name")]
  pub owner_name: String,
  pub created_at: String,
  pub data:       Option<String>,
}

impl ExportRow {
  pub const HEADERS: [&'static str; 6] =
    ["id", "type", "prodi", "user_name", "created_at", "data"];
}

/// Read `key` from a request body or spreadsheet row as text.
///
/// Strings are taken as-is, numbers and booleans are rendered. Empty strings,
/// nulls, arrays and objects count as absent.
pub fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
  match fields.get(key)? {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
