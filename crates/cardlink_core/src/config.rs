//! Handle management configuration.
//!
//! # Invariants
//! - `min_slug_len >= 1` and `max_slug_attempts >= 1` after `validate()`.
//! - Missing fields in a config document take their defaults.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slugs shorter than this are rejected before any store lookup.
pub const DEFAULT_MIN_SLUG_LEN: usize = 3;
/// Upper bound on candidate slugs probed for one allocation.
pub const DEFAULT_MAX_SLUG_ATTEMPTS: u32 = 1000;

/// Tunables injected into the slug allocator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandleConfig {
    pub min_slug_len: usize,
    pub max_slug_attempts: u32,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            min_slug_len: DEFAULT_MIN_SLUG_LEN,
            max_slug_attempts: DEFAULT_MAX_SLUG_ATTEMPTS,
        }
    }
}

impl HandleConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: HandleConfig =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_slug_len == 0 {
            return Err(ConfigError::OutOfRange("min_slug_len"));
        }
        if self.max_slug_attempts == 0 {
            return Err(ConfigError::OutOfRange("max_slug_attempts"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    OutOfRange(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid handle config: {message}"),
            Self::OutOfRange(field) => write!(f, "handle config `{field}` must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
