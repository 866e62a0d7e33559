use std::path::Path;

use hookenv_backend::Prefix;
use hookenv_core::lang_base::environment_dir;
use hookenv_platform::{EnvContext, EnvPatch};

pub const ENVIRONMENT_DIR: &str = "coursier";

/// Cache location inside the environment directory.
pub const CACHE_DIR: &str = ".cs-cache";

pub const CACHE_VAR: &str = "COURSIER_CACHE";

/// Launchers installed into `target_dir` shadow ambient ones, and every
/// download lands in a cache private to this environment.
#[must_use]
pub fn env_patch(target_dir: &Path) -> EnvPatch {
    EnvPatch::new()
        .prepend_path("PATH", target_dir)
        .set(CACHE_VAR, target_dir.join(CACHE_DIR))
}

#[must_use]
pub fn in_env(base: &EnvContext, prefix: &Prefix, version: &str) -> EnvContext {
    base.enter(&env_patch(&environment_dir(prefix, ENVIRONMENT_DIR, version)))
}
