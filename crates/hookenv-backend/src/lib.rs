mod error;
mod traits;
mod types;

pub use error::BackendError;
pub use traits::{BackendDetection, BackendProvider, LanguageBackend};
pub use types::{DEFAULT_VERSION, HealthReport, HookOutput, Prefix};
