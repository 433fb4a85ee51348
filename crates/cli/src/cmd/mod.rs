mod patch;
mod run;

pub use patch::cmd_patch;
pub use run::cmd_run;

use anyhow::{Context, Result};
use tracing::info;

use not_quite_cargo_lib::execute::ExecuteConfig;

/// Resolve the host configuration and log it.
fn load_config() -> Result<ExecuteConfig> {
  let config = ExecuteConfig::from_env().context("Failed to determine host configuration")?;

  info!(path = %config.project_root.display(), "PROJECT_ROOT");
  info!(path = %config.cargo_home.display(), "CARGO_HOME");
  info!(path = %config.rustc.display(), "RUSTC");

  Ok(config)
}
