//! Types for build plan execution.
//!
//! This module defines the host configuration shared by every component, the
//! error type of a run, and its summary.

use std::path::PathBuf;

use thiserror::Error;

use crate::consts::{CARGO_HOME_PLACEHOLDER, PROJECT_ROOT_PLACEHOLDER, RUSTC_PLACEHOLDER};
use crate::placeholder::Substitutions;
use crate::plan::PlanError;
use crate::platform::{PlatformError, ToolchainError, paths, toolchain};

/// Host values a plan is resolved against.
///
/// Built once at startup and passed by reference to patching and running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteConfig {
  /// Replaces `{{PROJECT_ROOT}}`.
  pub project_root: PathBuf,

  /// Replaces `{{CARGO_HOME}}`.
  pub cargo_home: PathBuf,

  /// Replaces `{{RUSTC}}`, and runs invocations without a program.
  pub rustc: PathBuf,
}

impl ExecuteConfig {
  /// Build the configuration from the process environment.
  ///
  /// - `PROJECT_ROOT`, defaulting to the current directory
  /// - `CARGO_HOME`, defaulting to `~/.cargo`
  /// - the compiler, located with [`toolchain::find_rustc`]
  pub fn from_env() -> Result<Self, PlatformError> {
    Ok(Self {
      project_root: paths::project_root()?,
      cargo_home: paths::cargo_home(),
      rustc: toolchain::find_rustc(),
    })
  }

  /// Placeholder -> host value, used when running.
  pub fn substitutions(&self) -> Substitutions {
    Substitutions::new()
      .with(PROJECT_ROOT_PLACEHOLDER, self.project_root.to_string_lossy())
      .with(CARGO_HOME_PLACEHOLDER, self.cargo_home.to_string_lossy())
      .with(RUSTC_PLACEHOLDER, self.rustc.to_string_lossy())
  }

  /// Host value -> placeholder, used when patching.
  ///
  /// The compiler is left out: its location is resolved on every host.
  pub fn anonymizing(&self) -> Substitutions {
    let mut subs = self.substitutions();
    subs.remove(RUSTC_PLACEHOLDER);
    subs.inverted()
  }
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The build plan could not be read or interpreted.
  #[error(transparent)]
  Plan(#[from] PlanError),

  /// The compiler pre-flight check failed.
  #[error(transparent)]
  Toolchain(#[from] ToolchainError),

  /// Two invocations share a number.
  #[error("duplicate invocation number {0}")]
  DuplicateInvocation(usize),

  /// An invocation depends on a number no invocation has.
  #[error("invocation {invocation} depends on missing invocation {dependency}")]
  MissingDependency { invocation: usize, dependency: usize },

  /// No remaining invocation can be scheduled.
  #[error("could not resolve invocation order: circular dependencies among invocations {remaining:?}")]
  Unresolvable { remaining: Vec<usize> },

  /// The process could not be started.
  #[error("failed to launch `{cmd}`: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// The process exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// An output or `OUT_DIR` directory could not be created.
  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// An existing entry at a link path could not be removed.
  #[error("failed to remove existing {path}: {source}")]
  RemoveLink {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A symbolic link could not be created.
  #[error("failed to create symlink {link} -> {target}: {source}")]
  CreateLink {
    link: PathBuf,
    target: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Result of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
  /// Invocations executed successfully.
  pub executed: usize,

  /// Build scripts whose directives were captured.
  pub build_scripts: usize,

  /// Symbolic links created.
  pub links: usize,
}
