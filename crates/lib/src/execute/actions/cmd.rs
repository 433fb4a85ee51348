//! Process execution for a single invocation.
//!
//! The child inherits the engine's environment with the invocation's
//! variables layered on top. Both output streams are captured in full rather
//! than streamed, so a failing step can be reported as one block.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, error};

use crate::execute::types::ExecuteError;

/// Captured output of a successful process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmdOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Run a program to completion.
///
/// # Arguments
///
/// * `program` - The executable
/// * `args` - Its argument vector
/// * `env` - Variables set on top of the inherited environment
/// * `cwd` - Working directory; the engine's own when `None`
///
/// # Errors
///
/// `Spawn` if the process cannot start, `CmdFailed` if it exits
/// unsuccessfully. In both cases the command line is logged, and for a
/// failed exit so are the captured stdout and stderr.
pub async fn execute_cmd(
  program: &Path,
  args: &[String],
  env: &BTreeMap<String, String>,
  cwd: Option<&Path>,
) -> Result<CmdOutput, ExecuteError> {
  let cmd_line = display_command(program, args);

  let mut command = Command::new(program);
  command.args(args).envs(env);
  if let Some(cwd) = cwd {
    command.current_dir(cwd);
  }

  debug!(cwd = ?cwd, "spawning process");

  let output = match command.output().await {
    Ok(output) => output,
    Err(source) => {
      error!("failed to launch command:\n{cmd_line}");
      return Err(ExecuteError::Spawn { cmd: cmd_line, source });
    }
  };

  let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
  let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

  if !output.status.success() {
    error!("command failed:\n{cmd_line}");
    error!("stdout:\n{stdout}");
    error!("stderr:\n{stderr}");
    return Err(ExecuteError::CmdFailed {
      cmd: cmd_line,
      code: output.status.code(),
    });
  }

  if !stderr.is_empty() {
    debug!(stderr = %stderr, "command stderr");
  }

  Ok(CmdOutput { stdout, stderr })
}

/// Render a command line for logs.
///
/// Values following `--cfg` and `--check-cfg` are single-quoted, since they
/// usually contain double quotes or parentheses; the result can be pasted
/// into a shell.
pub fn display_command(program: &Path, args: &[String]) -> String {
  let mut parts = vec![program.display().to_string()];
  let mut quote_next = false;
  for arg in args {
    if quote_next {
      parts.push(format!("'{arg}'"));
    } else {
      parts.push(arg.clone());
    }
    quote_next = arg == "--cfg" || arg == "--check-cfg";
  }
  parts.join(" ")
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use crate::util::testutil::shell_cmd;
  use tempfile::TempDir;

  async fn run_script(script: &str, env: &BTreeMap<String, String>, cwd: Option<&Path>) -> Result<CmdOutput, ExecuteError> {
    let (program, args) = shell_cmd(script);
    execute_cmd(Path::new(&program), &args, env, cwd).await
  }

  #[tokio::test]
  async fn captures_stdout_and_stderr_separately() {
    let output = run_script("echo out; echo err >&2", &BTreeMap::new(), None).await.unwrap();

    assert_eq!(output.stdout, "out\n");
    assert_eq!(output.stderr, "err\n");
  }

  #[tokio::test]
  async fn env_is_layered_over_inherited() {
    let env = BTreeMap::from([("NQC_TEST_VAR".to_string(), "layered".to_string())]);

    let output = run_script("echo \"$NQC_TEST_VAR\"; test -n \"$PATH\" && echo has-path", &env, None)
      .await
      .unwrap();

    assert_eq!(output.stdout, "layered\nhas-path\n");
  }

  #[tokio::test]
  async fn runs_in_working_directory() {
    let temp = TempDir::new().unwrap();

    run_script("touch cwd_marker", &BTreeMap::new(), Some(temp.path()))
      .await
      .unwrap();

    assert!(temp.path().join("cwd_marker").exists());
  }

  #[tokio::test]
  async fn non_zero_exit_is_an_error() {
    let result = run_script("echo partial; exit 101", &BTreeMap::new(), None).await;

    assert!(matches!(result, Err(ExecuteError::CmdFailed { code: Some(101), .. })));
  }

  #[tokio::test]
  async fn missing_program_fails_to_launch() {
    let result = execute_cmd(
      Path::new("/nonexistent/bin/rustc"),
      &["--version".to_string()],
      &BTreeMap::new(),
      None,
    )
    .await;

    assert!(matches!(result, Err(ExecuteError::Spawn { ref cmd, .. }) if cmd == "/nonexistent/bin/rustc --version"));
  }

  #[test]
  fn display_quotes_cfg_values() {
    let args: Vec<String> = ["--crate-name", "app", "--cfg", "feature=\"std\"", "--check-cfg", "cfg(docsrs)"]
      .iter()
      .map(|s| s.to_string())
      .collect();

    assert_eq!(
      display_command(Path::new("rustc"), &args),
      "rustc --crate-name app --cfg 'feature=\"std\"' --check-cfg 'cfg(docsrs)'"
    );
  }
}
