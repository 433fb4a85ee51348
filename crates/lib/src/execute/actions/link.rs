//! Symbolic links declared by invocations.
//!
//! Cargo exposes final artifacts (`target/debug/app`) as links to the
//! hashed files it actually builds (`target/debug/deps/app-1a2b3c`).

use std::path::Path;

use tracing::{info, warn};

use crate::execute::types::ExecuteError;

/// Create a symbolic link at `link` pointing to `target`.
///
/// Whatever already exists at `link` is removed first, including a dangling
/// link left by an earlier run.
pub async fn create_link(link: &Path, target: &Path) -> Result<(), ExecuteError> {
  if let Ok(metadata) = tokio::fs::symlink_metadata(link).await {
    warn!(link = %link.display(), "link already exists, overwriting");

    let removed = if metadata.is_dir() {
      tokio::fs::remove_dir_all(link).await
    } else {
      tokio::fs::remove_file(link).await
    };

    removed.map_err(|source| ExecuteError::RemoveLink {
      path: link.to_path_buf(),
      source,
    })?;
  }

  symlink(target, link).await.map_err(|source| ExecuteError::CreateLink {
    link: link.to_path_buf(),
    target: target.to_path_buf(),
    source,
  })?;

  info!(link = %link.display(), target = %target.display(), "created symlink");
  Ok(())
}

#[cfg(unix)]
async fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  tokio::fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  tokio::fs::symlink_file(target, link).await
}
