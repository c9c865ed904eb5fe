//! HTML → PDF conversion through a headless Chromium subprocess.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use uuid::Uuid;

use crate::{Error, Result};

/// Prints HTML to PDF with `chromium --headless --print-to-pdf`.
///
/// Page size comes from the document's `@page` rule. Scratch files live in
/// `work_dir` and are removed after every render.
#[derive(Debug, Clone)]
pub struct ChromiumPdf {
  binary:   PathBuf,
  work_dir: PathBuf,
}

impl ChromiumPdf {
  pub fn new(binary: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
    Self { binary: binary.into(), work_dir: work_dir.into() }
  }

  pub async fn render(&self, html: &str) -> Result<Vec<u8>> {
    tokio::fs::create_dir_all(&self.work_dir).await?;
    let stem = Uuid::new_v4();
    let html_path = self.work_dir.join(format!("{stem}.html"));
    let pdf_path = self.work_dir.join(format!("{stem}.pdf"));

    tokio::fs::write(&html_path, html).await?;
    let result = self.print(&html_path, &pdf_path).await;

    for path in [&html_path, &pdf_path] {
      if let Err(e) = tokio::fs::remove_file(path).await
        && e.kind() != std::io::ErrorKind::NotFound
      {
        tracing::warn!(path = %path.display(), error = %e, "could not remove scratch file");
      }
    }
    result
  }

  async fn print(&self, html_path: &Path, pdf_path: &Path) -> Result<Vec<u8>> {
    let output = Command::new(&self.binary)
      .arg("--headless")
      .arg("--no-sandbox")
      .arg("--disable-setuid-sandbox")
      .arg("--disable-gpu")
      .arg("--no-pdf-header-footer")
      .arg(format!("--print-to-pdf={}", pdf_path.display()))
      .arg(format!("file://{}", html_path.display()))
      .kill_on_drop(true)
      .output()
      .await?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(Error::Renderer(format!("{}: {}", output.status, stderr.trim())));
    }

    Ok(tokio::fs::read(pdf_path).await?)
  }
}
