use std::fmt;
use std::path::{Path, PathBuf};

/// Version token meaning "whatever the host provides".
pub const DEFAULT_VERSION: &str = "default";

/// Project-local root a toolchain declaration lives under.
///
/// Backends only read paths relative to it and write inside their own
/// environment directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prefix {
    root: PathBuf,
}

impl Prefix {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path(&self, part: impl AsRef<Path>) -> PathBuf {
        self.root.join(part)
    }

    #[must_use]
    pub fn is_dir(&self, part: impl AsRef<Path>) -> bool {
        self.path(part).is_dir()
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl HookOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Fold a later batch into this one: streams are concatenated and any
    /// failure outranks success. Between two failures the higher code wins,
    /// so a negative (signal) code only survives next to zeros.
    pub fn merge(&mut self, batch: HookOutput) {
        if self.exit_code == 0 {
            self.exit_code = batch.exit_code;
        } else if batch.exit_code != 0 {
            self.exit_code = self.exit_code.max(batch.exit_code);
        }
        self.stdout.extend(batch.stdout);
        self.stderr.extend(batch.stderr);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReport {
    Healthy,
    Unhealthy(String),
}

impl HealthReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    #[must_use]
    pub fn diagnosis(&self) -> Option<&str> {
        match self {
            Self::Healthy => None,
            Self::Unhealthy(reason) => Some(reason),
        }
    }
}
