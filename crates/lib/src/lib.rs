//! not-quite-cargo-lib: execute cargo build plans without cargo
//!
//! This crate provides the engine behind the `not-quite-cargo` binary:
//! - `plan`: the build plan document, its invocations, and patch mode
//! - `placeholder`: deep substitution between host paths and placeholder tokens
//! - `execute`: dependency ordering, build script directives, and the run loop
//! - `platform`: host paths and toolchain discovery

pub mod consts;
pub mod execute;
pub mod placeholder;
pub mod plan;
pub mod platform;

#[cfg(test)]
pub(crate) mod util;
