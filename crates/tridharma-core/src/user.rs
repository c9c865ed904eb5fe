//! User accounts held by the credential store.

use serde::{Deserialize, Serialize};

use crate::identity::Role;

/// A stored account. The password hash is never serialised.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub id:            i64,
  pub name:          String,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role:          Role,
  #[serde(rename = "prodi")]
  pub department:    Option<String>,
  #[serde(rename = "nidn")]
  pub identifier:    Option<String>,
}

/// Input for [`crate::store::RecordStore::create_user`]. The caller hashes the
/// password before building this.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
  pub department:    Option<String>,
  pub identifier:    Option<String>,
}
