//! CLI smoke tests for not-quite-cargo.
//!
//! These tests run the binary against small build plans and check exit codes,
//! the rewritten plan file, and the effects of executed invocations.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Get a Command for the not-quite-cargo binary.
fn nqc_cmd() -> Command {
  cargo_bin_cmd!("not-quite-cargo")
}

/// A temp directory used as project root, canonicalized so paths in the plan
/// match what the binary sees.
fn project() -> (TempDir, PathBuf) {
  let temp = TempDir::new().unwrap();
  let root = dunce::canonicalize(temp.path()).unwrap();
  (temp, root)
}

/// A command with the host environment pinned to `root`.
fn host_cmd(root: &Path, rustc: &Path) -> Command {
  let mut cmd = nqc_cmd();
  cmd
    .env("PROJECT_ROOT", root)
    .env("CARGO_HOME", root.join("cargo-home"))
    .env("RUSTC", rustc)
    .env_remove("RUST_LOG");
  cmd
}

fn write_plan(root: &Path, plan: &Value) -> PathBuf {
  let path = root.join("build-plan.json");
  std::fs::write(&path, serde_json::to_string_pretty(plan).unwrap()).unwrap();
  path
}

fn read_plan(path: &Path) -> Value {
  serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  nqc_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  nqc_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("not-quite-cargo"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["patch", "run"] {
    nqc_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Usage Errors
// =============================================================================

#[test]
fn missing_mode_fails() {
  nqc_cmd().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_mode_fails() {
  nqc_cmd()
    .arg("build")
    .arg("build-plan.json")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn missing_build_plan_argument_fails() {
  nqc_cmd()
    .arg("run")
    .assert()
    .failure()
    .stderr(predicate::str::contains("required"));
}

// =============================================================================
// patch
// =============================================================================

#[test]
fn patch_anonymizes_plan_in_place() {
  let (_temp, root) = project();
  let rustc = root.join("toolchain/bin/rustc");
  let plan = json!({
    "invocations": [{
      "package_name": "app",
      "package_version": "0.1.0",
      "target_kind": ["bin"],
      "compile_mode": "build",
      "deps": [],
      "outputs": [format!("{}/target/debug/deps/app-1a2b", root.display())],
      "links": {},
      "program": "rustc",
      "args": ["--crate-name", "app", "--diagnostic-width=120"],
      "env": {
        "CARGO": "/usr/bin/cargo",
        "CARGO_HOME": root.join("cargo-home"),
        "CARGO_PKG_NAME": "app"
      },
      "cwd": root
    }],
    "inputs": [format!("{}/Cargo.toml", root.display())]
  });
  let path = write_plan(&root, &plan);

  host_cmd(&root, &rustc)
    .arg("patch")
    .arg(&path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Patched"));

  let patched = read_plan(&path);
  let inv = &patched["invocations"][0];
  assert_eq!(inv["program"], "{{RUSTC}}");
  assert_eq!(inv["cwd"], "{{PROJECT_ROOT}}");
  assert_eq!(inv["outputs"][0], "{{PROJECT_ROOT}}/target/debug/deps/app-1a2b");
  assert_eq!(inv["args"], json!(["--crate-name", "app"]));
  assert!(inv["env"].get("CARGO_HOME").is_none());
  assert!(inv["env"].get("CARGO").is_none());
  assert_eq!(inv["env"]["CARGO_PKG_NAME"], "app");
  assert_eq!(patched["inputs"][0], "{{PROJECT_ROOT}}/Cargo.toml");
}

#[test]
fn patch_nonexistent_plan_fails() {
  let (_temp, root) = project();

  host_cmd(&root, Path::new("/nonexistent/rustc"))
    .arg("patch")
    .arg(root.join("missing.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to patch build plan"));
}

#[test]
fn patch_rejects_non_plan_json() {
  let (_temp, root) = project();
  let path = write_plan(&root, &json!({ "packages": [] }));

  host_cmd(&root, Path::new("/nonexistent/rustc"))
    .arg("patch")
    .arg(&path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("does not look like a cargo build plan"));

  assert_eq!(read_plan(&path), json!({ "packages": [] }));
}

// =============================================================================
// run
// =============================================================================

#[cfg(unix)]
mod run {
  use super::*;

  /// A stand-in compiler that answers `-vV` and otherwise records its arguments.
  fn fake_rustc(root: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join("fake-rustc");
    std::fs::write(
      &path,
      "#!/bin/sh\nif [ \"$1\" = \"-vV\" ]; then echo 'rustc 1.87.0 (17067e9ac 2025-05-09)'; exit 0; fi\necho \"$@\" >> compiled.txt\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  fn invocation(package: &str, compile_mode: &str, deps: &[usize], program: &str, args: &[&str]) -> Value {
    json!({
      "package_name": package,
      "package_version": "0.1.0",
      "target_kind": [if compile_mode == "run-custom-build" { "custom-build" } else { "lib" }],
      "compile_mode": compile_mode,
      "deps": deps,
      "outputs": ["{{PROJECT_ROOT}}/target/debug/deps/lib.rlib"],
      "links": {},
      "program": program,
      "args": args,
      "env": {},
      "cwd": "{{PROJECT_ROOT}}"
    })
  }

  #[test]
  fn run_executes_plan_with_build_script_directives() {
    let (_temp, root) = project();
    let rustc = fake_rustc(&root);
    let path = write_plan(
      &root,
      &json!({
        "invocations": [
          invocation("app", "build", &[1], "{{RUSTC}}", &["--crate-name", "app"]),
          invocation("app", "run-custom-build", &[], "/bin/sh", &["-c", "echo cargo:rustc-cfg=has_simd"]),
        ]
      }),
    );

    host_cmd(&root, &rustc)
      .arg("run")
      .arg(&path)
      .assert()
      .success()
      .stdout(predicate::str::contains("Build plan complete"))
      .stderr(predicate::str::contains("rustc 1.87.0"));

    let compiled = std::fs::read_to_string(root.join("compiled.txt")).unwrap();
    assert_eq!(compiled, "--crate-name app --cfg has_simd\n");
    assert!(root.join("target/debug/deps").is_dir());
  }

  #[test]
  fn run_stops_at_failing_invocation() {
    let (_temp, root) = project();
    let rustc = fake_rustc(&root);
    let path = write_plan(
      &root,
      &json!({
        "invocations": [
          invocation("app", "build", &[], "/bin/sh", &["-c", "echo boom >&2; exit 7"]),
          invocation("app", "build", &[0], "{{RUSTC}}", &["--crate-name", "app"]),
        ]
      }),
    );

    host_cmd(&root, &rustc)
      .arg("run")
      .arg(&path)
      .assert()
      .failure()
      .stderr(predicate::str::contains("boom"))
      .stderr(predicate::str::contains("Failed to run build plan"));

    assert!(!root.join("compiled.txt").exists());
  }

  #[test]
  fn run_fails_without_working_compiler() {
    let (_temp, root) = project();
    let path = write_plan(
      &root,
      &json!({ "invocations": [invocation("app", "build", &[], "/bin/sh", &["-c", "touch ran"])] }),
    );

    host_cmd(&root, &root.join("no-such-rustc"))
      .arg("run")
      .arg(&path)
      .assert()
      .failure();

    assert!(!root.join("ran").exists());
  }

  #[test]
  fn run_rejects_cyclic_plan() {
    let (_temp, root) = project();
    let rustc = fake_rustc(&root);
    let path = write_plan(
      &root,
      &json!({
        "invocations": [
          invocation("a", "build", &[1], "{{RUSTC}}", &[]),
          invocation("b", "build", &[0], "{{RUSTC}}", &[]),
        ]
      }),
    );

    host_cmd(&root, &rustc)
      .arg("run")
      .arg(&path)
      .assert()
      .failure()
      .stderr(predicate::str::contains("circular dependencies"));

    assert!(!root.join("compiled.txt").exists());
  }
}
