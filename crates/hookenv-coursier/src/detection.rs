use log::debug;
use std::ffi::OsStr;
use std::path::Path;

use hookenv_backend::BackendError;
use hookenv_core::{CommandRunner, Invocation, Resolution, resolve_executable};

/// Accepted launcher names, highest priority first.
pub const EXECUTABLE_NAMES: [&str; 2] = ["cs", "coursier"];

#[must_use]
pub fn detect_coursier(search_path: Option<&OsStr>) -> Resolution {
    resolve_executable(&EXECUTABLE_NAMES, search_path)
}

#[must_use]
pub fn missing_executable_error() -> BackendError {
    let names = EXECUTABLE_NAMES
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(" or ");
    BackendError::fatal(format!(
        "hookenv requires system-installed {names} executables in the application search path"
    ))
}

pub(crate) async fn get_coursier_version(
    runner: &dyn CommandRunner,
    path: &Path,
) -> Option<String> {
    let output = runner
        .run(&Invocation::new(path).arg("version"))
        .await
        .ok()?;

    if !output.success() {
        debug!("`{} version` exited {}", path.display(), output.exit_code);
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.trim();
    (!version.is_empty()).then(|| version.to_string())
}
