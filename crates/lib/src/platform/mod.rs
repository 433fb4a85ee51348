//! Host platform: directories and toolchain discovery.

pub mod paths;
pub mod toolchain;

use std::path::PathBuf;

use thiserror::Error;

/// Errors determining host directories.
#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("failed to determine the current directory: {0}")]
  CurrentDir(#[source] std::io::Error),

  #[error("cannot determine the home directory: {0} is not set")]
  MissingHome(&'static str),
}

/// Errors running the compiler pre-flight check.
#[derive(Debug, Error)]
pub enum ToolchainError {
  #[error("failed to run {rustc}: {source}")]
  Launch {
    rustc: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed getting rustc version from {rustc} (exit code {code:?})")]
  VersionFailed { rustc: PathBuf, code: Option<i32> },
}

pub use toolchain::{find_rustc, rustc_version};
