use log::{debug, warn};
use thiserror::Error;

use hookenv_backend::{BackendError, HookOutput};
use hookenv_platform::EnvContext;

use crate::exec::{CommandRunner, Invocation};
use crate::resolve::{Resolution, resolve_executable};

/// Upper bound for one command line, program and arguments included.
pub const MAX_COMMAND_LENGTH: usize = 32 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Argument(s) too long: {0}")]
pub struct ArgumentTooLong(pub String);

fn command_length<'a>(parts: impl IntoIterator<Item = &'a String>) -> usize {
    parts.into_iter().map(|part| part.len() + 1).sum()
}

/// Split `varargs` into as few command lines as possible, each starting with
/// `cmd` and staying within `max_length`. Argument order is preserved and an
/// empty `varargs` still yields one command.
///
/// # Errors
/// Returns an error when a single argument cannot fit next to `cmd`.
pub fn partition(
    cmd: &[String],
    varargs: &[String],
    max_length: usize,
) -> Result<Vec<Vec<String>>, ArgumentTooLong> {
    let base_length = command_length(cmd);
    let mut partitions = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut total_length = base_length;

    for arg in varargs {
        let arg_length = arg.len() + 1;
        if base_length + arg_length > max_length {
            return Err(ArgumentTooLong(arg.clone()));
        }
        if total_length + arg_length > max_length {
            partitions.push(cmd.iter().cloned().chain(current.drain(..)).collect());
            total_length = base_length;
        }
        current.push(arg.clone());
        total_length += arg_length;
    }

    partitions.push(cmd.iter().cloned().chain(current).collect());
    Ok(partitions)
}

/// Run `cmd` once per partition of `varargs`, sequentially, inside `context`.
///
/// The program is resolved against the scoped search path first; when it
/// cannot be found, or an argument is too long, the run reports exit code 1
/// with a message instead of failing.
///
/// # Errors
/// Returns an error when `cmd` is empty or a batch cannot be spawned.
pub async fn xargs(
    runner: &dyn CommandRunner,
    context: &EnvContext,
    cmd: &[String],
    varargs: &[String],
) -> Result<HookOutput, BackendError> {
    let Some(program) = cmd.first() else {
        return Err(BackendError::fatal("hook entry resolved to an empty command"));
    };

    let executable = match resolve_executable(&[program.as_str()], context.search_path().as_deref())
    {
        Resolution::Found { path, .. } => path,
        Resolution::NotFound { .. } => {
            warn!("Hook executable `{program}` not found in scoped search path");
            return Ok(failure(format!("Executable `{program}` not found")));
        }
    };

    let partitions = match partition(cmd, varargs, MAX_COMMAND_LENGTH) {
        Ok(partitions) => partitions,
        Err(error) => return Ok(failure(error.to_string())),
    };
    debug!(
        "Running `{program}` over {} file argument(s) in {} batch(es)",
        varargs.len(),
        partitions.len()
    );

    let mut combined: Option<HookOutput> = None;
    for batch in partitions {
        let invocation = Invocation::new(&executable)
            .args(batch.into_iter().skip(1))
            .env(context.clone());
        let output = runner.run(&invocation).await?;
        match combined.as_mut() {
            Some(combined) => combined.merge(output),
            None => combined = Some(output),
        }
    }
    Ok(combined.unwrap_or_default())
}

fn failure(message: String) -> HookOutput {
    HookOutput {
        exit_code: 1,
        stdout: Vec::new(),
        stderr: message.into_bytes(),
    }
}
