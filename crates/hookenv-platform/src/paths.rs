use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Build host paths for the current platform.
    ///
    /// # Errors
    /// Returns an error when a required base directory (for example the user
    /// home/config/data directory) cannot be determined.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            Ok(Self {
                config_dir: home.join("Library/Application Support/hookenv"),
                data_dir: home.join("Library/Application Support/hookenv"),
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join("hookenv"),
                data_dir: dirs::data_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join("hookenv"),
            })
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("hookenv.log")
    }

    #[must_use]
    pub fn install_lock_file(&self) -> PathBuf {
        self.data_dir.join("install.lock")
    }

    /// Ensure all host directories exist on disk.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
