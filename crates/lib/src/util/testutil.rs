//! Test utilities for not-quite-cargo-lib.
//!
//! Build plan invocations run real processes, so tests need small programs
//! with predictable behavior. These helpers provide them on Unix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::plan::Invocation;

/// Returns the program and args to run a shell script.
///
/// Arguments appended later reach the script as `$1`, `$2`, ...
pub fn shell_cmd(script: &str) -> (String, Vec<String>) {
  (
    "/bin/sh".to_string(),
    vec!["-c".to_string(), script.to_string(), "sh".to_string()],
  )
}

/// Write an executable script into `dir` and return its path.
#[cfg(unix)]
pub fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// An invocation of `package` running a shell script in `cwd`.
pub fn script_invocation(number: usize, package: &str, script: &str, cwd: &Path) -> Invocation {
  let (program, args) = shell_cmd(script);
  Invocation {
    number,
    package_name: package.to_string(),
    package_version: "0.1.0".to_string(),
    target_kind: vec!["lib".to_string()],
    kind: None,
    compile_mode: "build".to_string(),
    deps: Default::default(),
    outputs: Vec::new(),
    links: BTreeMap::new(),
    program,
    args,
    env: BTreeMap::new(),
    cwd: cwd.to_string_lossy().to_string(),
  }
}
