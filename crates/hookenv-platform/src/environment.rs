//! Environment patches and the two ways of applying them.
//!
//! An [`EnvPatch`] is an ordered list of variable mutations. It never touches
//! the process by itself; it is either resolved into an [`EnvContext`], which
//! is handed to every spawned subprocess, or applied to the process
//! environment through a [`ScopedEnv`] guard that restores on drop.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

use log::{debug, trace};

#[cfg(windows)]
pub const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
pub const PATH_SEPARATOR: &str = ":";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchPart {
    Literal(OsString),
    /// The value the named variable had before this entry was applied.
    Var(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchValue {
    Unset,
    Parts(Vec<PatchPart>),
}

impl PatchValue {
    #[must_use]
    pub fn literal(value: impl Into<OsString>) -> Self {
        Self::Parts(vec![PatchPart::Literal(value.into())])
    }

    /// Render the value, looking up `Var` parts through `lookup`. A missing
    /// variable renders as the empty string.
    fn render(&self, lookup: impl Fn(&str) -> Option<OsString>) -> Option<OsString> {
        match self {
            Self::Unset => None,
            Self::Parts(parts) => {
                let mut rendered = OsString::new();
                for part in parts {
                    match part {
                        PatchPart::Literal(value) => rendered.push(value),
                        PatchPart::Var(name) => {
                            if let Some(prior) = lookup(name) {
                                rendered.push(prior);
                            }
                        }
                    }
                }
                Some(rendered)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvPatch {
    entries: Vec<(String, PatchValue)>,
}

impl EnvPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: PatchValue) -> Self {
        self.entries.push((name.into(), value));
        self
    }

    #[must_use]
    pub fn set(self, name: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.with(name, PatchValue::literal(value))
    }

    #[must_use]
    pub fn unset(self, name: impl Into<String>) -> Self {
        self.with(name, PatchValue::Unset)
    }

    /// Put `dir` in front of a search-path variable, keeping its prior value
    /// after the separator.
    #[must_use]
    pub fn prepend_path(self, name: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        let name = name.into();
        let value = PatchValue::Parts(vec![
            PatchPart::Literal(dir.as_ref().as_os_str().to_owned()),
            PatchPart::Literal(OsString::from(PATH_SEPARATOR)),
            PatchPart::Var(name.clone()),
        ]);
        self.with(name, value)
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, PatchValue)] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Environment seen by subprocesses spawned inside a scope.
///
/// Holds only the variables that differ from the process environment; an
/// override of `None` means the variable is removed for the child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvContext {
    overrides: BTreeMap<String, Option<OsString>>,
}

impl EnvContext {
    #[must_use]
    pub fn ambient() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_ambient(&self) -> bool {
        self.overrides.is_empty()
    }

    #[must_use]
    pub fn var_os(&self, name: &str) -> Option<OsString> {
        match self.overrides.get(name) {
            Some(value) => value.clone(),
            None => std::env::var_os(name),
        }
    }

    #[must_use]
    pub fn search_path(&self) -> Option<OsString> {
        self.var_os("PATH")
    }

    /// Resolve `patch` on top of this context. Entries are applied in order,
    /// so a `Var` part sees the values left by earlier entries and by any
    /// enclosing scope.
    #[must_use]
    pub fn enter(&self, patch: &EnvPatch) -> Self {
        let mut scoped = self.clone();
        for (name, value) in patch.entries() {
            let rendered = value.render(|var| scoped.var_os(var));
            debug!("Scoped env: {name}={rendered:?}");
            scoped.overrides.insert(name.clone(), rendered);
        }
        scoped
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, Option<&OsStr>)> {
        self.overrides
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

/// Applies a patch to the process environment until dropped.
///
/// Not safe to use concurrently from several threads: the process
/// environment is shared, so callers serialize access to it. Nested guards
/// must be dropped in reverse order of creation, which lexical scoping
/// guarantees.
#[must_use = "the patch is reverted as soon as the guard is dropped"]
pub struct ScopedEnv {
    saved: Vec<(String, Option<OsString>)>,
}

impl ScopedEnv {
    pub fn enter(patch: &EnvPatch) -> Self {
        let mut saved = Vec::with_capacity(patch.len());
        for (name, value) in patch.entries() {
            saved.push((name.clone(), std::env::var_os(name)));
            let rendered = value.render(|var| std::env::var_os(var));
            trace!("Patching process env: {name}={rendered:?}");
            // SAFETY: callers serialize access to the process environment
            // while a guard is alive.
            unsafe {
                match rendered {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
        Self { saved }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (name, previous) in self.saved.iter().rev() {
            trace!("Restoring process env: {name}={previous:?}");
            // SAFETY: see `ScopedEnv::enter`.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}
