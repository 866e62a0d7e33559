mod commands;
mod environment;
mod paths;

pub use commands::ConfigureCommand;
pub use environment::{EnvContext, EnvPatch, PATH_SEPARATOR, PatchPart, PatchValue, ScopedEnv};
pub use paths::{AppPaths, AppPathsError};
