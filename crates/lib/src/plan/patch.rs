//! Patch mode: make a build plan portable.
//!
//! Patching strips what only makes sense on the generating host and replaces
//! host paths with placeholder tokens, so the plan can be run elsewhere.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use crate::consts::{
  CARGO_ENV, CARGO_HOME_ENV, DIAGNOSTIC_WIDTH_FLAG, PROJECT_ROOT_ENV, RUSTC_BIN, RUSTC_ENV, RUSTC_PLACEHOLDER,
};
use crate::execute::ExecuteConfig;

use super::{PlanError, read_document};

/// Environment entries injected fresh on every run, so never persisted.
const HOST_ENV_KEYS: [&str; 4] = [CARGO_ENV, PROJECT_ROOT_ENV, CARGO_HOME_ENV, RUSTC_ENV];

/// What a patch changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSummary {
  pub invocations: usize,
  pub programs_replaced: usize,
  pub env_removed: usize,
  pub args_dropped: usize,
}

/// Patch a build plan file in place.
///
/// The file is only written once the whole document has been patched and
/// serialized; any error leaves it untouched.
pub fn patch_plan_file(path: &Path, config: &ExecuteConfig) -> Result<PatchSummary, PlanError> {
  info!(path = %path.display(), "patching build plan");

  let document = read_document(path)?;
  let (patched, summary) = patch_plan(document, config)?;

  let mut buf = Vec::new();
  let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
  patched.serialize(&mut serializer).map_err(PlanError::Serialize)?;
  buf.push(b'\n');

  std::fs::write(path, buf).map_err(|source| PlanError::Write {
    path: path.to_path_buf(),
    source,
  })?;

  info!(
    path = %path.display(),
    invocations = summary.invocations,
    programs_replaced = summary.programs_replaced,
    env_removed = summary.env_removed,
    args_dropped = summary.args_dropped,
    "patched build plan saved"
  );

  Ok(summary)
}

/// Patch a build plan document.
///
/// For every invocation:
/// - a program that is the compiler becomes `{{RUSTC}}`
/// - `CARGO`, `RUSTC`, `CARGO_HOME` and `PROJECT_ROOT` are removed from `env`
/// - `--diagnostic-width` arguments are dropped
///
/// Then the project root and cargo home are replaced by their placeholders
/// everywhere in the document, keys included. Unknown top-level keys are
/// carried through.
pub fn patch_plan(document: Value, config: &ExecuteConfig) -> Result<(Value, PatchSummary), PlanError> {
  let Value::Object(mut map) = document else {
    return Err(PlanError::MissingInvocations);
  };

  let Some(Value::Array(invocations)) = map.get_mut("invocations") else {
    return Err(PlanError::MissingInvocations);
  };

  let rustc_path = config.rustc.to_string_lossy();
  let mut summary = PatchSummary::default();

  for (index, invocation) in invocations.iter_mut().enumerate() {
    let Value::Object(invocation) = invocation else {
      return Err(PlanError::InvalidInvocation {
        index,
        source: serde::de::Error::custom("invocation is not an object"),
      });
    };
    summary.invocations += 1;

    if let Some(Value::String(program)) = invocation.get_mut("program")
      && (program.as_str() == RUSTC_BIN || program.as_str() == rustc_path.as_ref())
    {
      *program = RUSTC_PLACEHOLDER.to_string();
      summary.programs_replaced += 1;
    }

    if let Some(Value::Object(env)) = invocation.get_mut("env") {
      for key in HOST_ENV_KEYS {
        if env.shift_remove(key).is_some() {
          summary.env_removed += 1;
        }
      }
    }

    if let Some(Value::Array(args)) = invocation.get_mut("args") {
      let before = args.len();
      args.retain(|arg| !arg.as_str().is_some_and(|a| a.starts_with(DIAGNOSTIC_WIDTH_FLAG)));
      summary.args_dropped += before - args.len();
    }

    debug!(index, "patched invocation");
  }

  let patched = config.anonymizing().apply(Value::Object(map));
  Ok((patched, summary))
}
