use thiserror::Error;

use hookenv_backend::BackendError;
use hookenv_platform::AppPathsError;

use crate::lock::LockError;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("install lock task failed: {0}")]
    LockTask(#[from] tokio::task::JoinError),
    #[error("failed to resolve application paths: {0}")]
    Paths(#[from] AppPathsError),
    #[error("unknown backend `{name}`")]
    UnknownBackend { name: String },
    #[error("failed to {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl HostError {
    pub fn io(action: &'static str, source: std::io::Error) -> Self {
        Self::Io { action, source }
    }
}
