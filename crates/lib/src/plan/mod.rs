//! Build plan documents.
//!
//! A build plan is read once as a raw JSON tree so that patch mode can keep
//! every key cargo wrote, then converted to typed [`Invocation`]s for running.

pub mod patch;
pub mod types;

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::consts::{CARGO_HOME_PLACEHOLDER, PROJECT_ROOT_PLACEHOLDER, RUSTC_PLACEHOLDER};
use crate::placeholder::find_token;

pub use patch::{PatchSummary, patch_plan, patch_plan_file};
pub use types::{BuildPlan, Invocation};

/// Errors reading, interpreting, or writing a build plan document.
#[derive(Debug, Error)]
pub enum PlanError {
  #[error("failed to read build plan {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse build plan {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("{0} does not look like a cargo build plan (no `invocations` list)")]
  NotABuildPlan(PathBuf),

  #[error("build plan has no `invocations` list")]
  MissingInvocations,

  #[error("invalid invocation at index {index}: {source}")]
  InvalidInvocation {
    index: usize,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid input at index {index}: expected a path string, found {found}")]
  InvalidInput { index: usize, found: Value },

  #[error("placeholder {0} is still present after substitution")]
  UnresolvedPlaceholder(String),

  #[error("failed to serialize build plan: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to write build plan {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Read a build plan document, checking it has an `invocations` list.
pub fn read_document(path: &Path) -> Result<Value, PlanError> {
  let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let document: Value = serde_json::from_str(&content).map_err(|source| PlanError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  if !document.get("invocations").is_some_and(Value::is_array) {
    return Err(PlanError::NotABuildPlan(path.to_path_buf()));
  }

  Ok(document)
}

/// Fail if any placeholder token survived substitution.
pub fn ensure_resolved(document: &Value) -> Result<(), PlanError> {
  let tokens = [PROJECT_ROOT_PLACEHOLDER, CARGO_HOME_PLACEHOLDER, RUSTC_PLACEHOLDER];
  match find_token(document, &tokens) {
    Some(token) => Err(PlanError::UnresolvedPlaceholder(token.to_string())),
    None => Ok(()),
  }
}

impl BuildPlan {
  /// Convert a raw document into typed invocations, numbering them by position.
  pub fn from_document(document: Value) -> Result<Self, PlanError> {
    let Value::Object(mut map) = document else {
      return Err(PlanError::MissingInvocations);
    };

    let Some(Value::Array(raw)) = map.remove("invocations") else {
      return Err(PlanError::MissingInvocations);
    };

    let invocations = raw
      .into_iter()
      .enumerate()
      .map(|(index, item)| {
        let mut invocation: Invocation =
          serde_json::from_value(item).map_err(|source| PlanError::InvalidInvocation { index, source })?;
        invocation.number = index;
        Ok(invocation)
      })
      .collect::<Result<Vec<_>, PlanError>>()?;

    let inputs = match map.remove("inputs") {
      Some(Value::Array(items)) => Some(
        items
          .into_iter()
          .enumerate()
          .map(|(index, item)| match item {
            Value::String(path) => Ok(path),
            found => Err(PlanError::InvalidInput { index, found }),
          })
          .collect::<Result<Vec<_>, PlanError>>()?,
      ),
      _ => None,
    };

    Ok(Self { invocations, inputs })
  }
}
