//! Implementation of the `not-quite-cargo run` command.
//!
//! Resolves a patched build plan against this host and executes it.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use not_quite_cargo_lib::execute::run_plan;

use crate::output::{format_duration, print_stat, print_success};

pub fn cmd_run(build_plan: &Path) -> Result<()> {
  let start = Instant::now();
  let config = super::load_config()?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let summary = rt
    .block_on(run_plan(build_plan, &config))
    .with_context(|| format!("Failed to run build plan: {}", build_plan.display()))?;

  print_success(&format!(
    "Build plan complete in {}",
    format_duration(start.elapsed())
  ));
  print_stat("Invocations executed", &summary.executed.to_string());
  print_stat("Build scripts run", &summary.build_scripts.to_string());
  print_stat("Links created", &summary.links.to_string());

  Ok(())
}
