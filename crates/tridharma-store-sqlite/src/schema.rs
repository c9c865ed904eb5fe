//! SQL schema for the Tridharma SQLite store.
//!
//! Executed at connection startup and by the `migrate` command. Future
//! migrations will be gated on `PRAGMA user_version`.

/// Schema version stamped into `PRAGMA user_version` after [`SCHEMA`] runs.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL,
    email     TEXT NOT NULL UNIQUE,
    password  TEXT NOT NULL,          -- argon2 PHC string, never plaintext
    role      TEXT NOT NULL,          -- 'admin_pusat' | 'admin_prodi' | other
    prodi     TEXT,
    nidn      TEXT
);

CREATE TABLE IF NOT EXISTS dosen (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL,
    prodi     TEXT NOT NULL,
    nidn      TEXT NOT NULL
);

-- No UPDATE or DELETE is ever issued against this table.
-- AUTOINCREMENT keeps ids monotonic so `ORDER BY id DESC` is newest first.
CREATE TABLE IF NOT EXISTS kegiatan (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    type        TEXT NOT NULL,
    prodi       TEXT,
    user_name   TEXT NOT NULL,        -- stamped from the token, never the body
    user_id     INTEGER NOT NULL,
    data_json   TEXT,                 -- the request body, verbatim
    file_path   TEXT,                 -- '/uploads/<name>' or NULL
    created_at  TEXT NOT NULL         -- RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS dosen_prodi_idx         ON dosen(prodi);
CREATE INDEX IF NOT EXISTS dosen_nidn_idx          ON dosen(nidn);
CREATE INDEX IF NOT EXISTS kegiatan_prodi_idx      ON kegiatan(prodi);
CREATE INDEX IF NOT EXISTS kegiatan_user_name_idx  ON kegiatan(user_name);
CREATE INDEX IF NOT EXISTS kegiatan_type_idx       ON kegiatan(type);
";
