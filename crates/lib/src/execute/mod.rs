//! Build plan execution.
//!
//! This module provides the entry points for running a build plan:
//! - [`run_plan`] reads, resolves, and orders a plan document, then runs it
//! - [`execute_invocations`] runs already ordered invocations one by one
//!
//! Execution is strictly sequential. Each process is awaited to completion and
//! the first failure aborts the run.

pub mod actions;
pub mod dag;
pub mod directives;
pub mod types;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::consts::{CARGO_HOME_ENV, OUT_DIR_ENV, PROJECT_ROOT_ENV, RUN_CUSTOM_BUILD, RUSTC_ENV};
use crate::placeholder::Substitutions;
use crate::plan::{self, BuildPlan, Invocation};
use crate::platform::rustc_version;

use actions::{create_link, display_command, ensure_dir, execute_cmd};

pub use dag::{InvocationDag, resolve_order};
pub use directives::{Directive, DirectiveSet};
pub use types::{ExecuteConfig, ExecuteError, RunSummary};

/// Run the build plan at `path` on this host.
///
/// 1. Reads the document and replaces every placeholder with its host value
/// 2. Fails if any placeholder survived
/// 3. Orders the invocations by their dependencies
/// 4. Checks the compiler answers `-vV`
/// 5. Executes the invocations
///
/// Nothing is spawned unless steps 1 to 4 succeed.
pub async fn run_plan(path: &Path, config: &ExecuteConfig) -> Result<RunSummary, ExecuteError> {
  let document = plan::read_document(path)?;
  let document = config.substitutions().apply(document);
  plan::ensure_resolved(&document)?;

  let plan = BuildPlan::from_document(document)?;
  info!(
    path = %path.display(),
    invocations = plan.invocations.len(),
    "loaded build plan"
  );

  let ordered = resolve_order(plan.invocations)?;

  rustc_version(&config.rustc).await?;

  execute_invocations(ordered, config).await
}

/// Execute invocations in the given order.
///
/// Build script directives captured from a `run-custom-build` step are
/// applied to every later invocation of the same package.
pub async fn execute_invocations(
  invocations: Vec<Invocation>,
  config: &ExecuteConfig,
) -> Result<RunSummary, ExecuteError> {
  let total = invocations.len();
  let display = config.substitutions().inverted();
  let mut directives: HashMap<String, DirectiveSet> = HashMap::new();
  let mut summary = RunSummary::default();

  for (position, mut inv) in invocations.into_iter().enumerate() {
    let program = if inv.program.is_empty() {
      config.rustc.clone()
    } else {
      PathBuf::from(&inv.program)
    };

    if let Some(set) = directives.get(&inv.package_name) {
      debug!(package = %inv.package_name, args = set.args.len(), env = set.env.len(), "applying build script directives");
      set.apply(&mut inv.args, &mut inv.env);
    }

    for dir in inv.output_dirs() {
      ensure_dir(&dir).await?;
    }
    if let Some(out_dir) = inv.env.get(OUT_DIR_ENV) {
      ensure_dir(Path::new(out_dir)).await?;
    }

    log_progress(&inv, &program, position + 1, total, &display);
    debug!("{}", display_command(&program, &inv.args));

    let env = invocation_env(&inv, config);
    let cwd = (!inv.cwd.is_empty()).then(|| Path::new(&inv.cwd));
    let output = execute_cmd(&program, &inv.args, &env, cwd).await?;

    for (link, target) in &inv.links {
      create_link(Path::new(link), Path::new(target)).await?;
      summary.links += 1;
    }

    if inv.runs_build_script() {
      let set = DirectiveSet::from_output(&inv.package_name, &output.stdout);
      debug!(
        package = %inv.package_name,
        args = set.args.len(),
        env = set.env.len(),
        "captured build script directives"
      );
      directives.insert(inv.package_name.clone(), set);
      summary.build_scripts += 1;
    }

    summary.executed += 1;
  }

  info!(
    executed = summary.executed,
    build_scripts = summary.build_scripts,
    links = summary.links,
    "build plan execution complete"
  );

  Ok(summary)
}

/// The host variables every process receives, with the invocation's own on top.
fn invocation_env(inv: &Invocation, config: &ExecuteConfig) -> BTreeMap<String, String> {
  let mut env = BTreeMap::from([
    (RUSTC_ENV.to_string(), config.rustc.to_string_lossy().into_owned()),
    (CARGO_HOME_ENV.to_string(), config.cargo_home.to_string_lossy().into_owned()),
    (PROJECT_ROOT_ENV.to_string(), config.project_root.to_string_lossy().into_owned()),
  ]);
  env.extend(inv.env.iter().map(|(k, v)| (k.clone(), v.clone())));
  env
}

fn log_progress(inv: &Invocation, program: &Path, n: usize, total: usize, display: &Substitutions) {
  let program = display.apply_str(&program.to_string_lossy());
  info!(
    "({n}/{total}) Running '{program}' for package '{}' v{}",
    inv.package_name, inv.package_version
  );

  if inv.is_build_script_target() {
    match inv.compile_mode.as_str() {
      "build" => info!(package = %inv.package_name, "compiling build script"),
      RUN_CUSTOM_BUILD => info!(package = %inv.package_name, "running build script"),
      mode => warn!(package = %inv.package_name, mode, "unknown compile mode for build script target"),
    }
  }
}
