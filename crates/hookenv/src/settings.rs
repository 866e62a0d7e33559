use serde::{Deserialize, Serialize};
use std::path::Path;

use hookenv_platform::AppPaths;

use crate::backend_kind::BackendKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,

    #[serde(default)]
    pub default_backend: Option<BackendKind>,
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
            default_backend: None,
        }
    }
}

impl HostSettings {
    pub fn load() -> Self {
        let Ok(paths) = AppPaths::new() else {
            return Self::default();
        };
        Self::load_from(&paths.settings_file())
    }

    /// Missing or unreadable files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                log::warn!("Ignoring invalid settings {}: {error}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn backend(&self) -> BackendKind {
        self.default_backend.unwrap_or(BackendKind::DEFAULT)
    }
}
