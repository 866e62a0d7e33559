use log::{debug, info};
use std::ffi::{OsStr, OsString};
use std::path::Path;

use hookenv_backend::{BackendError, Prefix};
use hookenv_core::lang_base::{
    assert_version_default, environment_dir, prepare_environment_dir, setup_cmd,
};
use hookenv_core::{CommandRunner, Invocation, Resolution, write_install_state};
use hookenv_platform::EnvContext;

use crate::detection::{detect_coursier, missing_executable_error};
use crate::environment::{ENVIRONMENT_DIR, in_env};

/// Optional directory of app descriptors; each file stem names an app.
pub const CHANNEL_DIR: &str = ".pre-commit-channel";

/// Options shared by the `fetch` and `install` halves of one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    pub options: Vec<OsString>,
}

impl InstallStep {
    /// Resolution pinned to the local channel, default channels disabled.
    fn channel_app(channel: &Path, app: &OsStr) -> Self {
        Self {
            options: vec![
                OsString::from("--default-channels=false"),
                OsString::from("--channel"),
                channel.as_os_str().to_owned(),
                app.to_owned(),
            ],
        }
    }

    /// Plain dependency coordinates resolved through the default channels.
    fn dependencies(additional_dependencies: &[String]) -> Self {
        Self {
            options: additional_dependencies.iter().map(OsString::from).collect(),
        }
    }
}

/// Work out what to install without touching anything: one step per channel
/// app in listing order, then one step for all additional dependencies.
///
/// # Errors
/// Returns a fatal error when there is neither a channel directory nor any
/// additional dependency, and an IO error when the channel cannot be listed.
pub async fn plan_install(
    prefix: &Prefix,
    additional_dependencies: &[String],
) -> Result<Vec<InstallStep>, BackendError> {
    let channel = prefix.path(CHANNEL_DIR);
    let mut steps = Vec::new();

    if prefix.is_dir(CHANNEL_DIR) {
        let mut entries = tokio::fs::read_dir(&channel)
            .await
            .map_err(|error| BackendError::io_context("failed to list channel", error))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|error| BackendError::io_context("failed to list channel", error))?
        {
            let descriptor = entry.path();
            if let Some(app) = descriptor.file_stem() {
                debug!("Channel app {app:?} from {}", descriptor.display());
                steps.push(InstallStep::channel_app(&channel, app));
            }
        }
    } else if additional_dependencies.is_empty() {
        return Err(BackendError::fatal(format!(
            "expected {CHANNEL_DIR} dir or additional_dependencies"
        )));
    }

    if !additional_dependencies.is_empty() {
        steps.push(InstallStep::dependencies(additional_dependencies));
    }

    Ok(steps)
}

pub(crate) async fn install_environment(
    runner: &dyn CommandRunner,
    base: &EnvContext,
    prefix: &Prefix,
    version: &str,
    additional_dependencies: &[String],
) -> Result<(), BackendError> {
    assert_version_default(ENVIRONMENT_DIR, version)?;

    let cs = match detect_coursier(base.search_path().as_deref()) {
        Resolution::Found { name, path } => {
            debug!("Using {name} at {}", path.display());
            path
        }
        Resolution::NotFound { .. } => return Err(missing_executable_error()),
    };

    let envdir = environment_dir(prefix, ENVIRONMENT_DIR, version);
    let steps = plan_install(prefix, additional_dependencies).await?;
    info!(
        "Installing coursier environment {} ({} step(s))",
        envdir.display(),
        steps.len()
    );

    prepare_environment_dir(&envdir).await?;
    let context = in_env(base, prefix, version);

    for step in &steps {
        setup_cmd(
            runner,
            prefix,
            Invocation::new(&cs)
                .arg("fetch")
                .args(step.options.iter().cloned())
                .env(context.clone()),
        )
        .await?;
        setup_cmd(
            runner,
            prefix,
            Invocation::new(&cs)
                .arg("install")
                .arg("--dir")
                .arg(envdir.as_os_str())
                .args(step.options.iter().cloned())
                .env(context.clone()),
        )
        .await?;
    }

    write_install_state(&envdir, additional_dependencies).await?;
    info!("Installed coursier environment {}", envdir.display());
    Ok(())
}
