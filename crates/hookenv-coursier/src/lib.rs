mod backend;
mod detection;
mod environment;
mod install;
mod provider;

pub use backend::CoursierBackend;
pub use detection::{EXECUTABLE_NAMES, detect_coursier, missing_executable_error};
pub use environment::{CACHE_DIR, CACHE_VAR, ENVIRONMENT_DIR, env_patch, in_env};
pub use install::{CHANNEL_DIR, InstallStep, plan_install};
pub use provider::CoursierProvider;
