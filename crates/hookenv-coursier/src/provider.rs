use async_trait::async_trait;

use hookenv_backend::{BackendDetection, BackendProvider, LanguageBackend};
use hookenv_core::{ProcessRunner, Resolution};
use hookenv_platform::EnvContext;

use crate::backend::CoursierBackend;
use crate::detection::{EXECUTABLE_NAMES, detect_coursier, get_coursier_version};

#[derive(Default)]
pub struct CoursierProvider;

impl CoursierProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BackendProvider for CoursierProvider {
    fn name(&self) -> &'static str {
        "coursier"
    }

    fn display_name(&self) -> &'static str {
        "Coursier (JVM application launcher)"
    }

    async fn detect(&self) -> BackendDetection {
        match detect_coursier(EnvContext::ambient().search_path().as_deref()) {
            Resolution::Found { name, path } => {
                let version = get_coursier_version(&ProcessRunner, &path).await;
                BackendDetection {
                    found: true,
                    executable: EXECUTABLE_NAMES
                        .iter()
                        .copied()
                        .find(|candidate| *candidate == name),
                    path: Some(path),
                    version,
                }
            }
            Resolution::NotFound { .. } => BackendDetection {
                found: false,
                executable: None,
                path: None,
                version: None,
            },
        }
    }

    fn create_backend(&self) -> Box<dyn LanguageBackend> {
        Box::new(CoursierBackend::new())
    }
}
