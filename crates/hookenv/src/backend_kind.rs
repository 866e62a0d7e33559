use serde::{Deserialize, Serialize};

use hookenv_backend::BackendProvider;
use hookenv_coursier::CoursierProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Coursier,
}

impl BackendKind {
    pub const DEFAULT: Self = Self::Coursier;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coursier => "coursier",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "coursier" => Some(Self::Coursier),
            _ => None,
        }
    }

    pub fn provider(self) -> Box<dyn BackendProvider> {
        match self {
            Self::Coursier => Box::new(CoursierProvider::new()),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
