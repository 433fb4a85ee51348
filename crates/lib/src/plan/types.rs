//! Build plan types.
//!
//! These mirror the JSON emitted by `cargo build --build-plan`. The document
//! shape belongs to cargo, so every field cargo may leave out is defaulted.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Deserialize;

use crate::consts::{CUSTOM_BUILD_TARGET, RUN_CUSTOM_BUILD};

/// One build step: a single process execution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Invocation {
  /// Position in the plan's `invocations` list. Dependencies refer to it.
  #[serde(skip)]
  pub number: usize,

  pub package_name: String,
  pub package_version: String,

  #[serde(default)]
  pub target_kind: Vec<String>,

  /// `host` or `target`, when cargo records it.
  #[serde(default)]
  pub kind: Option<String>,

  /// `build`, `test`, `run-custom-build`, ...
  pub compile_mode: String,

  /// Numbers of the invocations that must complete first.
  #[serde(default)]
  pub deps: BTreeSet<usize>,

  /// Files this step produces.
  #[serde(default)]
  pub outputs: Vec<String>,

  /// Link path -> link target, created after the step succeeds.
  #[serde(default)]
  pub links: BTreeMap<String, String>,

  /// Executable. Empty means the located compiler.
  #[serde(default)]
  pub program: String,

  #[serde(default)]
  pub args: Vec<String>,

  #[serde(default)]
  pub env: BTreeMap<String, String>,

  #[serde(default)]
  pub cwd: String,
}

impl Invocation {
  /// Whether this step runs a build script whose output carries directives.
  pub fn runs_build_script(&self) -> bool {
    self.compile_mode == RUN_CUSTOM_BUILD
  }

  /// Whether this step belongs to a build script target (compiling or running it).
  pub fn is_build_script_target(&self) -> bool {
    self.target_kind.iter().any(|k| k == CUSTOM_BUILD_TARGET)
  }

  /// Parent directories of the declared outputs, in declaration order.
  pub fn output_dirs(&self) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for output in &self.outputs {
      if let Some(parent) = std::path::Path::new(output).parent()
        && !parent.as_os_str().is_empty()
        && !dirs.iter().any(|d| d == parent)
      {
        dirs.push(parent.to_path_buf());
      }
    }
    dirs
  }
}

/// A whole build plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
  pub invocations: Vec<Invocation>,

  /// Manifest and source paths cargo considered; carried, never interpreted.
  pub inputs: Option<Vec<String>>,
}
