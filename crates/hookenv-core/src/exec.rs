use async_trait::async_trait;
use log::{debug, error, info, trace};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use hookenv_backend::{BackendError, HookOutput};
use hookenv_platform::{ConfigureCommand, EnvContext};

/// One subprocess call: program, arguments, working directory and the
/// scoped environment it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub env: EnvContext,
}

impl Invocation {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: EnvContext::ambient(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub fn env(mut self, context: EnvContext) -> Self {
        self.env = context;
        self
    }

    /// Program and arguments as display strings.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy().into_owned())
            .collect()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture both streams. A non-zero exit is not an
    /// error at this level.
    async fn run(&self, invocation: &Invocation) -> Result<HookOutput, BackendError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<HookOutput, BackendError> {
        info!("Executing command: {}", invocation.argv().join(" "));

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .scoped_env(&invocation.env)
            .stdin(Stdio::null())
            .hide_window();
        if let Some(dir) = &invocation.cwd {
            debug!("Working directory: {}", dir.display());
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|error| {
            BackendError::io_context(
                &format!("failed to spawn {}", invocation.program.display()),
                error,
            )
        })?;

        debug!("Command exit status: {:?}", output.status);
        trace!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        if !output.stderr.is_empty() {
            trace!("stderr: {}", String::from_utf8_lossy(&output.stderr));
        }

        Ok(HookOutput {
            exit_code: exit_code(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Signals map to their negated number, the way a shell reports them.
fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

/// Run and turn a non-zero exit into [`BackendError::CommandFailed`] with the
/// captured streams attached.
///
/// # Errors
/// Returns an error when the process cannot be spawned or exits non-zero.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
) -> Result<HookOutput, BackendError> {
    let output = runner.run(invocation).await?;
    if output.success() {
        return Ok(output);
    }

    let command = invocation.argv();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    error!(
        "Command failed: argv={command:?}, exit={}, stderr='{stderr}'",
        output.exit_code
    );
    Err(BackendError::CommandFailed {
        command,
        exit_code: output.exit_code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr,
    })
}
