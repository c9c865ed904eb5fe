//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tridharma_core::{
  activity::{ActivityRecord, NewActivity},
  faculty::{FacultyRecord, NewFaculty},
  policy::Scope,
  store::RecordStore,
  user::{NewUser, User},
};

use crate::{
  Result,
  encode::{
    ACTIVITY_COLUMNS, FACULTY_COLUMNS, Filter, RawActivity, RawUser, USER_COLUMNS, encode_dt,
    faculty_from_row,
  },
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tridharma record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The `PRAGMA user_version` of the open database.
  pub async fn schema_version(&self) -> Result<i64> {
    let version: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    Ok(version)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let name     = input.name.clone();
    let email    = input.email.clone();
    let password = input.password_hash.clone();
    let role     = input.role.as_str();
    let prodi    = input.department.clone();
    let nidn     = input.identifier.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (name, email, password, role, prodi, nidn)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![name, email, password, role, prodi, nidn],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User {
      id,
      name:          input.name,
      email:         input.email,
      password_hash: input.password_hash,
      role:          input.role,
      department:    input.department,
      identifier:    input.identifier,
    })
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawUser::into_user))
  }

  // ── Faculty ───────────────────────────────────────────────────────────────

  async fn insert_faculty(&self, input: NewFaculty) -> Result<FacultyRecord> {
    let name  = input.name.clone();
    let prodi = input.department.clone();
    let nidn  = input.identifier.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO dosen (name, prodi, nidn) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, prodi, nidn],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(FacultyRecord {
      id,
      name:       input.name,
      department: input.department,
      identifier: input.identifier,
    })
  }

  async fn list_faculty(&self, scope: &Scope) -> Result<Vec<FacultyRecord>> {
    let Some((where_clause, param)) = Filter::faculty(scope).into_sql() else {
      return Ok(Vec::new());
    };
    let sql = format!("SELECT {FACULTY_COLUMNS} FROM dosen {where_clause} ORDER BY id");

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(param.iter()), faculty_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  // ── Activities ────────────────────────────────────────────────────────────

  async fn insert_activity(&self, input: NewActivity) -> Result<ActivityRecord> {
    let kind       = input.kind.clone();
    let prodi      = input.department.clone();
    let user_name  = input.owner_name.clone();
    let user_id    = input.owner_id;
    let data_json  = serde_json::to_string(&input.payload)?;
    let file_path  = input.attachment_path.clone();
    let created_at = encode_dt(input.created_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kegiatan (
             type, prodi, user_name, user_id, data_json, file_path, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![kind, prodi, user_name, user_id, data_json, file_path, created_at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(activity_id = id, "kegiatan row inserted");

    Ok(ActivityRecord {
      id,
      kind:            input.kind,
      department:      input.department,
      owner_name:      input.owner_name,
      owner_id:        input.owner_id,
      payload:         Some(input.payload),
      attachment_path: input.attachment_path,
      created_at:      input.created_at,
    })
  }

  async fn list_activities(&self, scope: &Scope) -> Result<Vec<ActivityRecord>> {
    let Some((where_clause, param)) = Filter::activity(scope).into_sql() else {
      return Ok(Vec::new());
    };
    let sql =
      format!("SELECT {ACTIVITY_COLUMNS} FROM kegiatan {where_clause} ORDER BY id DESC");

    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(param.iter()), RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_record).collect()
  }
}
