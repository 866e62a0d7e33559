#[cfg(windows)]
use std::os::windows::process::CommandExt;

use crate::environment::EnvContext;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

/// Builder adapters shared by every spawned subprocess.
pub trait ConfigureCommand {
    fn hide_window(&mut self) -> &mut Self;

    /// Apply the overrides of a scoped environment to the child.
    fn scoped_env(&mut self, context: &EnvContext) -> &mut Self;
}

impl ConfigureCommand for tokio::process::Command {
    #[cfg(windows)]
    fn hide_window(&mut self) -> &mut Self {
        self.creation_flags(CREATE_NO_WINDOW)
    }

    #[cfg(not(windows))]
    fn hide_window(&mut self) -> &mut Self {
        self
    }

    fn scoped_env(&mut self, context: &EnvContext) -> &mut Self {
        for (name, value) in context.overrides() {
            match value {
                Some(value) => self.env(name, value),
                None => self.env_remove(name),
            };
        }
        self
    }
}
