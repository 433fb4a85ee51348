//! Per-invocation actions.
//!
//! Each function here performs one side effect of running an invocation.

pub mod cmd;
pub mod fs;
pub mod link;

pub use cmd::{CmdOutput, display_command, execute_cmd};
pub use fs::ensure_dir;
pub use link::create_link;
