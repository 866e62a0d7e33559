use async_trait::async_trait;
use std::path::PathBuf;

use hookenv_platform::EnvContext;

use crate::error::BackendError;
use crate::types::{DEFAULT_VERSION, HealthReport, HookOutput, Prefix};

#[derive(Debug, Clone)]
pub struct BackendDetection {
    pub found: bool,
    pub executable: Option<&'static str>,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

#[async_trait]
pub trait BackendProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    async fn detect(&self) -> BackendDetection;
    fn create_backend(&self) -> Box<dyn LanguageBackend>;
}

/// Lifecycle operations the hook engine drives for one toolchain ecosystem.
#[async_trait]
pub trait LanguageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tag used to name environment directories, `None` when the backend
    /// installs nothing.
    fn environment_dir_tag(&self) -> Option<&'static str>;

    fn get_default_version(&self) -> String {
        DEFAULT_VERSION.to_string()
    }

    /// Scoped environment every install and run for `(prefix, version)`
    /// executes in.
    fn in_env(&self, prefix: &Prefix, version: &str) -> EnvContext;

    /// Diagnose an installed environment. Problems are reported, not raised.
    async fn health_check(&self, prefix: &Prefix, version: &str) -> HealthReport;

    async fn install_environment(
        &self,
        prefix: &Prefix,
        version: &str,
        additional_dependencies: &[String],
    ) -> Result<(), BackendError>;

    async fn run_hook(
        &self,
        prefix: &Prefix,
        version: &str,
        entry: &str,
        args: &[String],
        file_args: &[String],
    ) -> Result<HookOutput, BackendError>;
}
