//! Roles and the authenticated identity carried by a session token.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::user::User;

/// The closed set of roles understood by the access layer.
///
/// Parsing is total: any string other than the two admin roles is a
/// [`Role::Member`], matching how unknown roles have always been treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
  /// Central administrator; sees every department.
  AdminPusat,
  /// Department (prodi) administrator.
  AdminProdi,
  /// A faculty member; sees only their own rows.
  Member,
}

impl Role {
  pub fn parse(s: &str) -> Self {
    match s {
      "admin_pusat" => Self::AdminPusat,
      "admin_prodi" => Self::AdminProdi,
      _ => Self::Member,
    }
  }

  /// Canonical name, which is also what gets persisted. Every member role,
  /// whatever text it was registered with, is stored as `"dosen"`.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::AdminPusat => "admin_pusat",
      Self::AdminProdi => "admin_prodi",
      Self::Member => "dosen",
    }
  }

  pub fn is_admin(self) -> bool { matches!(self, Self::AdminPusat | Self::AdminProdi) }
}

impl From<String> for Role {
  fn from(s: String) -> Self { Self::parse(&s) }
}

impl From<Role> for String {
  fn from(role: Role) -> Self { role.as_str().to_owned() }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Who is making a request. Built from verified token claims, never from a
/// request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub id:         i64,
  pub role:       Role,
  #[serde(rename = "prodi")]
  pub department: Option<String>,
  pub name:       String,
  /// The faculty member's national identifier (NIDN).
  #[serde(rename = "nidn")]
  pub identifier: Option<String>,
}

impl From<&User> for Identity {
  fn from(user: &User) -> Self {
    Self {
      id:         user.id,
      role:       user.role,
      department: user.department.clone(),
      name:       user.name.clone(),
      identifier: user.identifier.clone(),
    }
  }
}
