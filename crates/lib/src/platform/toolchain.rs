//! Toolchain discovery.
//!
//! The compiler is located once per process, in this order:
//! 1. the `RUSTC` environment variable
//! 2. `rustup which rustc`, if rustup is on the `PATH`
//! 3. `rustc` on the `PATH`
//! 4. the bare name `rustc`, left for the first invocation to fail on

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, error, info, warn};

use crate::consts::{RUSTC_BIN, RUSTC_ENV};

use super::ToolchainError;

/// Locate the compiler binary.
pub fn find_rustc() -> PathBuf {
  if let Some(rustc) = std::env::var_os(RUSTC_ENV).filter(|v| !v.is_empty()) {
    let rustc = PathBuf::from(rustc);
    info!(rustc = %rustc.display(), "found rustc using RUSTC environment variable");
    return rustc;
  }

  if let Some(rustc) = rustup_which_rustc() {
    info!(rustc = %rustc.display(), "found rustc using rustup");
    return rustc;
  }

  match which::which(RUSTC_BIN) {
    Ok(rustc) => {
      info!(rustc = %rustc.display(), "found rustc by searching PATH");
      rustc
    }
    Err(_) => {
      warn!("could not find rustc, falling back to bare 'rustc'");
      PathBuf::from(RUSTC_BIN)
    }
  }
}

/// Ask rustup for the default toolchain's compiler.
fn rustup_which_rustc() -> Option<PathBuf> {
  let rustup = which::which("rustup").ok()?;
  debug!(rustup = %rustup.display(), "asking rustup for rustc");

  // Outside any project, so a rust-toolchain file does not pick the toolchain
  let output = match Command::new(&rustup)
    .args(["which", RUSTC_BIN])
    .current_dir(neutral_dir())
    .output()
  {
    Ok(output) => output,
    Err(e) => {
      debug!(error = %e, "failed to run rustup");
      return None;
    }
  };

  if !output.status.success() {
    debug!(
      code = ?output.status.code(),
      stderr = %String::from_utf8_lossy(&output.stderr),
      "rustup which rustc failed"
    );
    return None;
  }

  let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
  (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(unix)]
fn neutral_dir() -> PathBuf {
  PathBuf::from("/")
}

#[cfg(not(unix))]
fn neutral_dir() -> PathBuf {
  std::env::temp_dir()
}

/// Run `<rustc> -vV` and return the first line of its banner.
///
/// A compiler that cannot report its version cannot run a build plan either,
/// so this is checked before any invocation starts.
pub async fn rustc_version(rustc: &Path) -> Result<String, ToolchainError> {
  let output = tokio::process::Command::new(rustc)
    .arg("-vV")
    .output()
    .await
    .map_err(|source| ToolchainError::Launch {
      rustc: rustc.to_path_buf(),
      source,
    })?;

  let stdout = String::from_utf8_lossy(&output.stdout);

  if !output.status.success() {
    error!("stdout:\n{}", stdout);
    error!("stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    return Err(ToolchainError::VersionFailed {
      rustc: rustc.to_path_buf(),
      code: output.status.code(),
    });
  }

  let banner = stdout.lines().next().unwrap_or_default().trim().to_string();
  info!(rustc = %rustc.display(), version = %banner, "rustc version");

  Ok(banner)
}
