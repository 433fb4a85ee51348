//! Implementation of the `not-quite-cargo patch` command.
//!
//! Rewrites a freshly generated build plan so that host paths become
//! placeholders, making the file usable on another machine.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use not_quite_cargo_lib::plan::patch_plan_file;

use crate::output::{format_duration, print_stat, print_success};

pub fn cmd_patch(build_plan: &Path) -> Result<()> {
  let start = Instant::now();
  let config = super::load_config()?;

  let summary = patch_plan_file(build_plan, &config)
    .with_context(|| format!("Failed to patch build plan: {}", build_plan.display()))?;

  print_success(&format!(
    "Patched {} in {}",
    build_plan.display(),
    format_duration(start.elapsed())
  ));
  print_stat("Invocations", &summary.invocations.to_string());
  print_stat("Programs replaced", &summary.programs_replaced.to_string());
  print_stat("Environment variables removed", &summary.env_removed.to_string());
  print_stat("Arguments dropped", &summary.args_dropped.to_string());

  Ok(())
}
