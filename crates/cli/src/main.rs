mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_patch, cmd_run};
use output::print_error;

/// not-quite-cargo - Execute cargo build plans without cargo
#[derive(Parser)]
#[command(name = "not-quite-cargo")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (ignored when RUST_LOG is set)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Rewrite a build plan in place so it can run on another host
  Patch {
    /// Path to the build plan JSON file
    build_plan: PathBuf,
  },

  /// Execute every invocation of a build plan
  Run {
    /// Path to the build plan JSON file
    build_plan: PathBuf,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Patch { build_plan } => cmd_patch(&build_plan),
    Commands::Run { build_plan } => cmd_run(&build_plan),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
