//! Lifecycle helpers shared by every language backend.

use log::{debug, info};
use std::path::{Path, PathBuf};

use hookenv_backend::{BackendError, DEFAULT_VERSION, HealthReport, HookOutput, Prefix};
use hookenv_platform::EnvContext;

use crate::exec::{CommandRunner, Invocation, run_checked};
use crate::install_state::read_install_state;
use crate::xargs::xargs;

/// `<prefix>/<tag>-<version>`: one directory per (prefix, version) pair.
#[must_use]
pub fn environment_dir(prefix: &Prefix, tag: &str, version: &str) -> PathBuf {
    prefix.path(format!("{tag}-{version}"))
}

/// # Errors
/// Returns a fatal error for any version other than the default sentinel.
pub fn assert_version_default(binary: &str, version: &str) -> Result<(), BackendError> {
    if version == DEFAULT_VERSION {
        Ok(())
    } else {
        Err(BackendError::fatal(format!(
            "for now, hookenv requires system-installed {binary} -- \
             you selected `language_version: {version}`"
        )))
    }
}

#[must_use]
pub fn basic_get_default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// An environment is healthy once its directory holds files and the install
/// that produced them ran to completion.
pub async fn basic_health_check(envdir: &Path) -> HealthReport {
    let Ok(mut entries) = tokio::fs::read_dir(envdir).await else {
        return HealthReport::Unhealthy(format!(
            "environment directory {} does not exist",
            envdir.display()
        ));
    };
    if !matches!(entries.next_entry().await, Ok(Some(_))) {
        return HealthReport::Unhealthy(format!(
            "environment directory {} is empty",
            envdir.display()
        ));
    }
    if read_install_state(envdir).await.is_none() {
        return HealthReport::Unhealthy(format!(
            "environment directory {} has no install state; the install did not complete",
            envdir.display()
        ));
    }
    HealthReport::Healthy
}

/// Start an install from an empty directory, dropping whatever a previous
/// install left behind.
///
/// # Errors
/// Returns an error if the old directory cannot be removed or the new one
/// cannot be created.
pub async fn prepare_environment_dir(envdir: &Path) -> Result<(), BackendError> {
    let exists = tokio::fs::try_exists(envdir).await.map_err(|error| {
        BackendError::io_context("failed to inspect previous environment", error)
    })?;
    if exists {
        info!("Replacing existing environment {}", envdir.display());
        tokio::fs::remove_dir_all(envdir).await.map_err(|error| {
            BackendError::io_context("failed to remove previous environment", error)
        })?;
    }
    tokio::fs::create_dir_all(envdir)
        .await
        .map_err(|error| BackendError::io_context("failed to create environment directory", error))
}

/// Run an install step from the prefix root and fail on non-zero exit.
///
/// # Errors
/// Returns [`BackendError::CommandFailed`] with the captured output when the
/// step exits non-zero, or an IO error when it cannot be spawned.
pub async fn setup_cmd(
    runner: &dyn CommandRunner,
    prefix: &Prefix,
    invocation: Invocation,
) -> Result<(), BackendError> {
    let invocation = invocation.current_dir(prefix.root());
    debug!("Setup step: {}", invocation.argv().join(" "));
    run_checked(runner, &invocation).await?;
    Ok(())
}

/// Split a hook entry shell-style and append its configured arguments.
///
/// # Errors
/// Returns a fatal error when the entry has unbalanced quoting or is empty.
pub fn hook_cmd(entry: &str, args: &[String]) -> Result<Vec<String>, BackendError> {
    let mut cmd = shlex::split(entry)
        .filter(|parts| !parts.is_empty())
        .ok_or_else(|| BackendError::fatal(format!("could not parse hook entry `{entry}`")))?;
    cmd.extend(args.iter().cloned());
    Ok(cmd)
}

/// # Errors
/// Returns an error when the entry cannot be parsed or a batch cannot be
/// spawned. A hook that runs and fails is reported through the exit code.
pub async fn basic_run_hook(
    runner: &dyn CommandRunner,
    context: &EnvContext,
    entry: &str,
    args: &[String],
    file_args: &[String],
) -> Result<HookOutput, BackendError> {
    let cmd = hook_cmd(entry, args)?;
    xargs(runner, context, &cmd, file_args).await
}
