//! Tridharma server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `TRIDHARMA_*` environment variables, opens the SQLite store, and serves
//! the JSON API over HTTP.
//!
//! # Bootstrapping an administrator
//!
//! With `open_registration = false`, create the first account from the shell:
//!
//! ```sh
//! echo "s3cret" | server create-user --name Admin --email admin@kampus.id --role admin_pusat
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tridharma_core::{identity::Role, store::RecordStore as _, user::NewUser};
use tridharma_server::{AppState, ServerConfig, auth::hash_password};
use tridharma_store_sqlite::{SCHEMA_VERSION, SqliteStore};

#[derive(Parser)]
#[command(author, version, about = "Tridharma record-keeping server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Create or upgrade the database schema and exit.
  Migrate,
  /// Create an account; the password is read from stdin.
  CreateUser {
    #[arg(long)]
    name:  String,
    #[arg(long)]
    email: String,
    /// `admin_pusat`, `admin_prodi` or `dosen`.
    #[arg(long, default_value = "dosen")]
    role:  String,
    #[arg(long)]
    prodi: Option<String>,
    #[arg(long)]
    nidn:  Option<String>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TRIDHARMA").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, server_cfg).await,
    Command::Migrate => {
      let version = store.schema_version().await.context("failed to read schema version")?;
      anyhow::ensure!(
        version == SCHEMA_VERSION,
        "database schema is at version {version}, expected {SCHEMA_VERSION}"
      );
      tracing::info!(version, path = %store_path.display(), "schema is up to date");
      Ok(())
    }
    Command::CreateUser { name, email, role, prodi, nidn } => {
      let password = read_password()?;
      anyhow::ensure!(!password.is_empty(), "password must not be empty");

      let user = store
        .create_user(NewUser {
          name,
          email,
          password_hash: hash_password(&password).map_err(|e| anyhow::anyhow!("{e}"))?,
          role: Role::parse(&role),
          department: prodi,
          identifier: nidn,
        })
        .await
        .context("failed to create user")?;
      println!("created user {} ({}) with role {}", user.id, user.email, user.role);
      Ok(())
    }
  }
}

async fn serve(store: SqliteStore, mut server_cfg: ServerConfig) -> anyhow::Result<()> {
  anyhow::ensure!(
    !server_cfg.jwt_secret.is_empty(),
    "jwt_secret must be set (config.toml or TRIDHARMA_JWT_SECRET)"
  );
  server_cfg.upload_dir = expand_tilde(&server_cfg.upload_dir);
  tokio::fs::create_dir_all(&server_cfg.upload_dir)
    .await
    .with_context(|| format!("failed to create upload dir {:?}", server_cfg.upload_dir))?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(Arc::new(store), server_cfg);
  let app = tridharma_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from the first line of stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
