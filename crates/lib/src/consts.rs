//! Names and tokens shared across the engine.

/// Placeholder for the directory the build plan was generated in.
pub const PROJECT_ROOT_PLACEHOLDER: &str = "{{PROJECT_ROOT}}";

/// Placeholder for cargo's home directory (registry sources, git checkouts).
pub const CARGO_HOME_PLACEHOLDER: &str = "{{CARGO_HOME}}";

/// Placeholder for the compiler. Resolved on every host, never written to disk.
pub const RUSTC_PLACEHOLDER: &str = "{{RUSTC}}";

pub const PROJECT_ROOT_ENV: &str = "PROJECT_ROOT";
pub const CARGO_HOME_ENV: &str = "CARGO_HOME";
pub const RUSTC_ENV: &str = "RUSTC";
pub const CARGO_ENV: &str = "CARGO";
pub const OUT_DIR_ENV: &str = "OUT_DIR";

/// Bare compiler name as it appears in a freshly generated build plan.
pub const RUSTC_BIN: &str = "rustc";

/// Compile mode of an invocation that runs a build script.
pub const RUN_CUSTOM_BUILD: &str = "run-custom-build";

/// Target kind of build script targets.
pub const CUSTOM_BUILD_TARGET: &str = "custom-build";

/// Rendering hint tied to the generating terminal, dropped when patching.
pub const DIAGNOSTIC_WIDTH_FLAG: &str = "--diagnostic-width";
