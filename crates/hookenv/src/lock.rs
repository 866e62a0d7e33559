use fs2::FileExt;
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl LockError {
    fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}

/// Exclusive hold on the install lock file, released when dropped.
pub struct InstallLock {
    _file: File,
}

impl InstallLock {
    /// Blocks until no other process holds the lock at `path`.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let mut lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|error| LockError::io("failed to open install lock file", error))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                info!("Waiting for another install to finish ({})", path.display());
                lock_file
                    .lock_exclusive()
                    .map_err(|error| LockError::io("failed to acquire install lock", error))?;
            }
            Err(error) => {
                return Err(LockError::io("failed to acquire install lock", error));
            }
        }

        lock_file
            .set_len(0)
            .and_then(|()| lock_file.seek(SeekFrom::Start(0)).map(|_| ()))
            .and_then(|()| writeln!(lock_file, "{}", std::process::id()))
            .map_err(|error| LockError::io("failed to write install lock metadata", error))?;

        Ok(Self { _file: lock_file })
    }
}
