//! Directory preparation.

use std::path::Path;

use tracing::debug;

use crate::execute::types::ExecuteError;

/// Create a directory and its parents if they do not exist yet.
pub async fn ensure_dir(path: &Path) -> Result<(), ExecuteError> {
  debug!(path = %path.display(), "ensuring directory");
  tokio::fs::create_dir_all(path)
    .await
    .map_err(|source| ExecuteError::CreateDir {
      path: path.to_path_buf(),
      source,
    })
}
