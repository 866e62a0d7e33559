use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use hookenv_backend::{BackendError, HealthReport, HookOutput, LanguageBackend, Prefix};
use hookenv_core::lang_base::{
    basic_get_default_version, basic_health_check, basic_run_hook, environment_dir,
};
use hookenv_core::{CommandRunner, ProcessRunner};
use hookenv_platform::EnvContext;

use crate::detection::{detect_coursier, missing_executable_error};
use crate::environment::{ENVIRONMENT_DIR, in_env};
use crate::install::install_environment;

/// Installs JVM applications through a host-provided Coursier launcher into a
/// private directory and runs hooks against them.
#[derive(Clone)]
pub struct CoursierBackend {
    runner: Arc<dyn CommandRunner>,
    base_env: EnvContext,
}

impl CoursierBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            runner: Arc::new(ProcessRunner),
            base_env: EnvContext::ambient(),
        }
    }

    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Environment the launcher is resolved in and scopes are layered on.
    #[must_use]
    pub fn with_base_env(mut self, base_env: EnvContext) -> Self {
        self.base_env = base_env;
        self
    }
}

impl Default for CoursierBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageBackend for CoursierBackend {
    fn name(&self) -> &'static str {
        "coursier"
    }

    fn environment_dir_tag(&self) -> Option<&'static str> {
        Some(ENVIRONMENT_DIR)
    }

    fn get_default_version(&self) -> String {
        basic_get_default_version()
    }

    fn in_env(&self, prefix: &Prefix, version: &str) -> EnvContext {
        in_env(&self.base_env, prefix, version)
    }

    async fn health_check(&self, prefix: &Prefix, version: &str) -> HealthReport {
        if !detect_coursier(self.base_env.search_path().as_deref()).is_found() {
            return HealthReport::Unhealthy(missing_executable_error().to_string());
        }
        let envdir = environment_dir(prefix, ENVIRONMENT_DIR, version);
        debug!("Health check for {}", envdir.display());
        basic_health_check(&envdir).await
    }

    async fn install_environment(
        &self,
        prefix: &Prefix,
        version: &str,
        additional_dependencies: &[String],
    ) -> Result<(), BackendError> {
        install_environment(
            self.runner.as_ref(),
            &self.base_env,
            prefix,
            version,
            additional_dependencies,
        )
        .await
    }

    async fn run_hook(
        &self,
        prefix: &Prefix,
        version: &str,
        entry: &str,
        args: &[String],
        file_args: &[String],
    ) -> Result<HookOutput, BackendError> {
        let context = self.in_env(prefix, version);
        basic_run_hook(self.runner.as_ref(), &context, entry, args, file_args).await
    }
}
