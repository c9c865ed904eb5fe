//! Faculty (dosen) records.

use serde::{Deserialize, Serialize};

/// A faculty member belonging to exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyRecord {
  pub id:         i64,
  pub name:       String,
  #[serde(rename = "prodi")]
  pub department: String,
  #[serde(rename = "nidn")]
  pub identifier: String,
}

/// Creation input. Missing fields deserialise as empty strings so the access
/// layer can report them as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFaculty {
  #[serde(default)]
  pub name:       String,
  #[serde(default, rename = "prodi")]
  pub department: String,
  #[serde(default, rename = "nidn")]
  pub identifier: String,
}

impl NewFaculty {
  pub(crate) fn missing_field(&self) -> Option<&'static str> {
    [
      ("name", &self.name),
      ("prodi", &self.department),
      ("nidn", &self.identifier),
    ]
    .into_iter()
    .find(|(_, v)| v.trim().is_empty())
    .map(|(k, _)| k)
  }
}
