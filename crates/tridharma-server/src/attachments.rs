//! Local-disk storage for activity attachments.
//!
//! Files are written under the configured upload directory with a random
//! name; only the public path (`/uploads/<name>`) is persisted with the
//! activity.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use uuid::Uuid;

/// URL prefix under which the upload directory is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name: Option<String>,
  pub bytes:     Bytes,
}

#[derive(Debug, Clone)]
pub struct LocalAttachments {
  dir: PathBuf,
}

impl LocalAttachments {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Write `upload` to disk and return its public path.
  pub async fn store(&self, upload: &Upload) -> std::io::Result<String> {
    tokio::fs::create_dir_all(&self.dir).await?;

    let name = match upload.file_name.as_deref().and_then(extension) {
      Some(ext) => format!("{}.{ext}", Uuid::new_v4().simple()),
      None => Uuid::new_v4().simple().to_string(),
    };
    tokio::fs::write(self.dir.join(&name), &upload.bytes).await?;

    tracing::info!(file = %name, bytes = upload.bytes.len(), "attachment stored");
    Ok(format!("{PUBLIC_PREFIX}/{name}"))
  }

  /// Delete a file previously returned by [`store`](Self::store) whose
  /// activity was never persisted. Failures are logged, not returned.
  pub async fn discard(&self, public_path: &str) {
    let Some(name) = public_path
      .strip_prefix(PUBLIC_PREFIX)
      .and_then(|rest| rest.strip_prefix('/'))
      .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.'))
    else {
      tracing::warn!(path = public_path, "refusing to discard path outside upload dir");
      return;
    };
    match tokio::fs::remove_file(self.dir.join(name)).await {
      Ok(()) => tracing::info!(file = %name, "orphaned attachment removed"),
      Err(e) => tracing::warn!(file = %name, error = %e, "could not remove orphaned attachment"),
    }
  }
}

/// A short alphanumeric extension from a client-supplied file name.
fn extension(file_name: &str) -> Option<String> {
  let ext = Path::new(file_name).extension()?.to_str()?;
  (!ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    .then(|| ext.to_ascii_lowercase())
}
