use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

use hookenv_backend::BackendError;

pub const INSTALL_STATE_FILE: &str = ".install_state_v1";

/// Written last by a successful install, so its absence marks an
/// environment directory as incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallState {
    pub additional_dependencies: Vec<String>,
    pub installed_at: DateTime<Utc>,
}

/// Record a completed install. The marker is staged next to its final name
/// and renamed into place.
///
/// # Errors
/// Returns an error if the marker cannot be serialized or written.
pub async fn write_install_state(
    envdir: &Path,
    additional_dependencies: &[String],
) -> Result<(), BackendError> {
    let state = InstallState {
        additional_dependencies: additional_dependencies.to_vec(),
        installed_at: Utc::now(),
    };
    let content = serde_json::to_string_pretty(&state)
        .map_err(|error| BackendError::io_context("failed to serialize install state", error))?;

    let staging = envdir.join(format!("{INSTALL_STATE_FILE}staging"));
    tokio::fs::write(&staging, content)
        .await
        .map_err(|error| BackendError::io_context("failed to write install state", error))?;
    tokio::fs::rename(&staging, envdir.join(INSTALL_STATE_FILE))
        .await
        .map_err(|error| BackendError::io_context("failed to commit install state", error))?;

    debug!("Wrote install state to {}", envdir.display());
    Ok(())
}

/// Read the marker, treating a missing or unreadable one as "not installed".
pub async fn read_install_state(envdir: &Path) -> Option<InstallState> {
    let path = envdir.join(INSTALL_STATE_FILE);
    let content = tokio::fs::read_to_string(&path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(error) => {
            warn!("Ignoring corrupt install state {}: {error}", path.display());
            None
        }
    }
}
