use std::path::PathBuf;

use tracing::warn;

use crate::consts::{CARGO_HOME_ENV, PROJECT_ROOT_ENV};

use super::PlatformError;

/// Read an environment variable, treating an empty value as unset.
fn non_empty_var(name: &str) -> Option<PathBuf> {
  std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Returns the project root: `PROJECT_ROOT`, or the current directory.
pub fn project_root() -> Result<PathBuf, PlatformError> {
  match non_empty_var(PROJECT_ROOT_ENV) {
    Some(root) => Ok(root),
    None => std::env::current_dir().map_err(PlatformError::CurrentDir),
  }
}

/// Returns cargo's home directory: `CARGO_HOME`, or `~/.cargo`.
///
/// Without a home directory the literal `~/.cargo` is returned, which
/// resolves relative to the working directory.
pub fn cargo_home() -> PathBuf {
  if let Some(home) = non_empty_var(CARGO_HOME_ENV) {
    return home;
  }

  match home_dir() {
    Ok(home) => home.join(".cargo"),
    Err(e) => {
      warn!(error = %e, "falling back to ~/.cargo");
      PathBuf::from("~").join(".cargo")
    }
  }
}

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Result<PathBuf, PlatformError> {
  non_empty_var("USERPROFILE").ok_or(PlatformError::MissingHome("USERPROFILE"))
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Result<PathBuf, PlatformError> {
  non_empty_var("HOME").ok_or(PlatformError::MissingHome("HOME"))
}
