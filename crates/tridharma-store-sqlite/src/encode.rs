//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Activity payloads are stored as
//! compact JSON text. Roles are stored as their canonical name.

use chrono::{DateTime, Utc};
use tridharma_core::{
  activity::ActivityRecord,
  faculty::FacultyRecord,
  identity::Role,
  policy::Scope,
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// A single-column equality filter derived from a [`Scope`].
pub enum Filter {
  All,
  Eq(&'static str, String),
  /// The scope cannot match any row of this table.
  Empty,
}

impl Filter {
  pub fn faculty(scope: &Scope) -> Self {
    match scope {
      Scope::All => Self::All,
      Scope::Department(d) => Self::Eq("prodi", d.clone()),
      Scope::Identifier(n) => Self::Eq("nidn", n.clone()),
      Scope::OwnerName(_) | Scope::Nothing => Self::Empty,
    }
  }

  pub fn activity(scope: &Scope) -> Self {
    match scope {
      Scope::All => Self::All,
      Scope::Department(d) => Self::Eq("prodi", d.clone()),
      Scope::OwnerName(n) => Self::Eq("user_name", n.clone()),
      Scope::Identifier(_) | Scope::Nothing => Self::Empty,
    }
  }

  /// The `WHERE` clause and its single bound parameter, if any.
  pub fn into_sql(self) -> Option<(String, Option<String>)> {
    match self {
      Self::All => Some((String::new(), None)),
      Self::Eq(col, value) => Some((format!("WHERE {col} = ?1"), Some(value))),
      Self::Empty => None,
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, name, email, password, role, prodi, nidn";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:       i64,
  pub name:     String,
  pub email:    String,
  pub password: String,
  pub role:     String,
  pub prodi:    Option<String>,
  pub nidn:     Option<String>,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      name:     row.get(1)?,
      email:    row.get(2)?,
      password: row.get(3)?,
      role:     row.get(4)?,
      prodi:    row.get(5)?,
      nidn:     row.get(6)?,
    })
  }

  pub fn into_user(self) -> User {
    User {
      id:            self.id,
      name:          self.name,
      email:         self.email,
      password_hash: self.password,
      role:          Role::parse(&self.role),
      department:    self.prodi,
      identifier:    self.nidn,
    }
  }
}

pub const FACULTY_COLUMNS: &str = "id, name, prodi, nidn";

pub fn faculty_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FacultyRecord> {
  Ok(FacultyRecord {
    id:         row.get(0)?,
    name:       row.get(1)?,
    department: row.get(2)?,
    identifier: row.get(3)?,
  })
}

pub const ACTIVITY_COLUMNS: &str =
  "id, type, prodi, user_name, user_id, data_json, file_path, created_at";

/// Raw values read directly from a `kegiatan` row.
pub struct RawActivity {
  pub id:         i64,
  pub kind:       String,
  pub prodi:      Option<String>,
  pub user_name:  String,
  pub user_id:    i64,
  pub data_json:  Option<String>,
  pub file_path:  Option<String>,
  pub created_at: String,
}

impl RawActivity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      kind:       row.get(1)?,
      prodi:      row.get(2)?,
      user_name:  row.get(3)?,
      user_id:    row.get(4)?,
      data_json:  row.get(5)?,
      file_path:  row.get(6)?,
      created_at: row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<ActivityRecord> {
    let payload: Option<serde_json::Value> = self
      .data_json
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;

    Ok(ActivityRecord {
      id: self.id,
      kind: self.kind,
      department: self.prodi,
      owner_name: self.user_name,
      owner_id: self.user_id,
      payload,
      attachment_path: self.file_path,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
