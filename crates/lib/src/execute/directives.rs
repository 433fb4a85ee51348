//! Build script directives.
//!
//! A build script talks to cargo through lines of its standard output such
//! as `cargo:rustc-cfg=has_feature`. Cargo turns those into compiler flags
//! and environment variables for the rest of the package's build. Without
//! cargo, this module does the same: it parses the captured output into a
//! [`DirectiveSet`] that the run loop applies to the package's later
//! invocations.
//!
//! See <https://doc.rust-lang.org/cargo/reference/build-scripts.html>.

use std::collections::BTreeMap;

use tracing::warn;

/// Link search kinds rustc understands in `-L KIND=PATH`.
const LINK_SEARCH_KINDS: [&str; 5] = ["native", "crate", "dependency", "framework", "all"];

/// One parsed line of build script output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
  /// `rerun-if-changed` / `rerun-if-env-changed`: no incremental rebuilds here.
  Rerun,

  /// `rustc-cfg=VALUE`
  Cfg(String),

  /// `rustc-check-cfg=VALUE`
  CheckCfg(String),

  /// `rustc-link-lib=VALUE`
  LinkLib(String),

  /// `rustc-link-arg=VALUE`
  LinkArg(String),

  /// `rustc-link-search=[KIND=]PATH`
  LinkSearch { kind: Option<String>, path: String },

  /// `rustc-env=NAME=VALUE`
  Env { name: String, value: String },

  /// `warning=MESSAGE`
  Warning(String),

  /// A recognized marker with a key this engine does not handle.
  Unknown { key: String, value: String },

  /// A marker line that is not `KEY=VALUE`.
  Malformed(String),
}

impl Directive {
  /// Parse one line of output.
  ///
  /// Returns `None` for lines that are not directives at all. Both the
  /// `cargo:` and `cargo::` markers are accepted.
  pub fn parse(line: &str) -> Option<Self> {
    let line = line.trim();
    let data = line.strip_prefix("cargo::").or_else(|| line.strip_prefix("cargo:"))?;

    let Some((key, value)) = data.split_once('=') else {
      return Some(Self::Malformed(data.to_string()));
    };

    let value = value.to_string();
    let directive = match key {
      "rerun-if-changed" | "rerun-if-env-changed" => Self::Rerun,
      "rustc-cfg" => Self::Cfg(value),
      "rustc-check-cfg" => Self::CheckCfg(value),
      "rustc-link-lib" => Self::LinkLib(value),
      "rustc-link-arg" => Self::LinkArg(value),
      "rustc-link-search" => match value.split_once('=') {
        Some((kind, path)) => Self::LinkSearch {
          kind: Some(kind.to_string()),
          path: path.to_string(),
        },
        None => Self::LinkSearch { kind: None, path: value },
      },
      "rustc-env" => match value.split_once('=') {
        Some((name, val)) => Self::Env {
          name: name.to_string(),
          value: val.to_string(),
        },
        None => Self::Malformed(data.to_string()),
      },
      "warning" => Self::Warning(value),
      _ => Self::Unknown {
        key: key.to_string(),
        value,
      },
    };

    Some(directive)
  }
}

/// Compiler arguments and environment captured from one build script run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
  /// Extra arguments, appended in the order the script emitted them.
  pub args: Vec<String>,

  /// Extra environment variables.
  pub env: BTreeMap<String, String>,
}

impl DirectiveSet {
  /// Interpret the captured stdout of a build script of `package`.
  ///
  /// Malformed and unknown lines are logged and skipped; they never fail a run.
  pub fn from_output(package: &str, output: &str) -> Self {
    let mut set = Self::default();

    for directive in output.lines().filter_map(Directive::parse) {
      match directive {
        Directive::Rerun => {}
        Directive::Cfg(value) => set.push_flag("--cfg", value),
        Directive::CheckCfg(value) => set.push_flag("--check-cfg", value),
        Directive::LinkLib(value) => set.push_flag("-l", value),
        Directive::LinkArg(value) => set.push_flag("-C", format!("link-arg={value}")),
        Directive::LinkSearch { kind, path } => {
          if let Some(kind) = kind
            && !LINK_SEARCH_KINDS.contains(&kind.as_str())
          {
            warn!(package, kind = %kind, path = %path, "unknown rustc-link-search kind, adding path as is");
          }
          set.push_flag("-L", path);
        }
        Directive::Env { name, value } => {
          set.env.insert(name, value);
        }
        Directive::Warning(message) => warn!(package, "build script warning: {message}"),
        Directive::Unknown { key, value } => {
          warn!(package, key = %key, value = %value, "unknown build script directive");
        }
        Directive::Malformed(line) => {
          warn!(package, line = %line, "malformed build script output line (no '=')");
        }
      }
    }

    set
  }

  fn push_flag(&mut self, flag: &str, value: String) {
    self.args.push(flag.to_string());
    self.args.push(value);
  }

  pub fn is_empty(&self) -> bool {
    self.args.is_empty() && self.env.is_empty()
  }

  /// Add the directives to an invocation's arguments and environment.
  ///
  /// Arguments are appended. Environment variables the invocation already
  /// declares keep their value.
  pub fn apply(&self, args: &mut Vec<String>, env: &mut BTreeMap<String, String>) {
    args.extend(self.args.iter().cloned());
    for (name, value) in &self.env {
      env.entry(name.clone()).or_insert_with(|| value.clone());
    }
  }
}
