use std::fmt::Write as _;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Misconfiguration the user has to fix; never retried.
    #[error("{message}")]
    Fatal { message: String },

    #[error("{}", describe_failure(.command, .exit_code, .stdout, .stderr))]
    CommandFailed {
        command: Vec<String>,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("IO error ({kind}): {message}")]
    IoError {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl BackendError {
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    pub fn io_context<E>(context: &str, error: E) -> Self
    where
        E: Into<std::io::Error>,
    {
        let error = error.into();
        Self::IoError {
            kind: error.kind(),
            message: format!("{context}: {error}"),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn describe_failure(command: &[String], exit_code: &i32, stdout: &str, stderr: &str) -> String {
    let mut out = format!("command: {command:?}\nreturn code: {exit_code}\n");
    for (label, stream) in [("stdout", stdout), ("stderr", stderr)] {
        let stream = stream.trim_end();
        if stream.is_empty() {
            let _ = writeln!(out, "{label}: (none)");
        } else {
            let _ = writeln!(out, "{label}:");
            for line in stream.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
    out.truncate(out.trim_end().len());
    out
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
