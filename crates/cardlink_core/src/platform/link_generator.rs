//! Deterministic `(platform, handle) -> URL` mapping.

use crate::platform::registry::{PlatformRegistry, HANDLE_PLACEHOLDER};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Link generation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Platform is not in the injected registry.
    UnknownPlatform(String),
    /// Handle is empty after trimming.
    EmptyHandle,
}

impl Display for LinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPlatform(name) => write!(f, "unknown platform: {name}"),
            Self::EmptyHandle => write!(f, "handle must not be empty"),
        }
    }
}

impl Error for LinkError {}

/// Resolves profile URLs from the injected platform registry.
#[derive(Debug, Clone, Default)]
pub struct LinkGenerator {
    registry: PlatformRegistry,
}

impl LinkGenerator {
    pub fn new(registry: PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Builds the canonical profile URL for `handle` on `platform`.
    ///
    /// The trimmed handle is percent-encoded before substitution.
    pub fn generate(&self, platform: &str, handle: &str) -> Result<String, LinkError> {
        let spec = self
            .registry
            .get(platform)
            .ok_or_else(|| LinkError::UnknownPlatform(platform.to_string()))?;

        let handle = handle.trim();
        if handle.is_empty() {
            return Err(LinkError::EmptyHandle);
        }

        Ok(spec
            .url_template
            .replacen(HANDLE_PLACEHOLDER, &urlencoding::encode(handle), 1))
    }

    /// Returns whether `platform` participates in auto-sync.
    ///
    /// Unknown platforms are never eligible.
    pub fn is_auto_sync_eligible(&self, platform: &str) -> bool {
        self.registry
            .get(platform)
            .is_some_and(|spec| spec.auto_sync)
    }
}
