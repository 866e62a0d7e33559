use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found { name: String, path: PathBuf },
    NotFound { tried: Vec<String> },
}

impl Resolution {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found { path, .. } => Some(path),
            Self::NotFound { .. } => None,
        }
    }
}

/// Look up `names` in priority order on `search_path` and stop at the first
/// executable hit. Nothing is resolved when the search path is absent.
#[must_use]
pub fn resolve_executable(names: &[&str], search_path: Option<&OsStr>) -> Resolution {
    let tried = || -> Vec<String> { names.iter().map(|name| (*name).to_string()).collect() };
    let Some(search_path) = search_path else {
        debug!("No search path available to resolve {names:?}");
        return Resolution::NotFound { tried: tried() };
    };
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    for name in names {
        match which::which_in(name, Some(search_path), &cwd) {
            Ok(path) => {
                debug!("Resolved executable {name} at {}", path.display());
                return Resolution::Found {
                    name: (*name).to_string(),
                    path,
                };
            }
            Err(error) => debug!("Executable {name} not resolvable: {error}"),
        }
    }

    Resolution::NotFound { tried: tried() }
}
