//! Shared lifecycle library for hookenv language backends.
//!
//! Everything here is independent of a concrete toolchain:
//! - Executable resolution against a search path.
//! - Subprocess execution inside a scoped environment.
//! - File-argument batching for hook runs.
//! - Environment directory naming, version checks and health checks.
//! - The marker recording a completed install.

pub mod exec;
mod install_state;
pub mod lang_base;
mod resolve;
mod xargs;

/// Subprocess seam and the real process-backed implementation.
pub use exec::{CommandRunner, Invocation, ProcessRunner, run_checked};
/// Marker written into an environment directory after a successful install.
pub use install_state::{
    INSTALL_STATE_FILE, InstallState, read_install_state, write_install_state,
};
/// First-match executable lookup over an ordered list of names.
pub use resolve::{Resolution, resolve_executable};
/// Length-bounded batching of file arguments.
pub use xargs::{ArgumentTooLong, MAX_COMMAND_LENGTH, partition, xargs};
