//! Immutable platform registry.
//!
//! # Invariants
//! - Platform names are unique, compared ASCII case-insensitively.
//! - Every URL template contains the `{handle}` placeholder exactly once.
//! - Registry order is preserved; auto-sync inserts follow it.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Placeholder substituted by the link generator.
pub const HANDLE_PLACEHOLDER: &str = "{handle}";

/// One supported social platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSpec {
    /// Display and storage key, e.g. `Instagram`.
    pub name: String,
    /// URL with a single `{handle}` placeholder.
    pub url_template: String,
    /// Whether links for this platform are generated from the global handle.
    pub auto_sync: bool,
    /// Input hint shown next to the handle field.
    pub placeholder: String,
}

impl PlatformSpec {
    pub fn new(
        name: impl Into<String>,
        url_template: impl Into<String>,
        auto_sync: bool,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            auto_sync,
            placeholder: placeholder.into(),
        }
    }
}

/// Registry construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    EmptyName,
    DuplicatePlatform(String),
    MissingHandlePlaceholder(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "platform name must not be empty"),
            Self::DuplicatePlatform(name) => write!(f, "platform registered twice: {name}"),
            Self::MissingHandlePlaceholder(name) => write!(
                f,
                "url template for `{name}` must contain `{HANDLE_PLACEHOLDER}` exactly once"
            ),
        }
    }
}

impl Error for RegistryError {}

/// Fixed, shareable table of supported platforms.
///
/// Cloning is cheap; clones share the same table.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Arc<[PlatformSpec]>,
}

impl PlatformRegistry {
    /// Builds a registry from custom entries, validating names and templates.
    pub fn new(platforms: Vec<PlatformSpec>) -> Result<Self, RegistryError> {
        for (index, spec) in platforms.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if spec.url_template.matches(HANDLE_PLACEHOLDER).count() != 1 {
                return Err(RegistryError::MissingHandlePlaceholder(spec.name.clone()));
            }
            let duplicated = platforms[..index]
                .iter()
                .any(|earlier| earlier.name.eq_ignore_ascii_case(&spec.name));
            if duplicated {
                return Err(RegistryError::DuplicatePlatform(spec.name.clone()));
            }
        }

        Ok(Self {
            platforms: platforms.into(),
        })
    }

    /// Default platform table shipped with the application.
    pub fn builtin() -> Self {
        let platforms = vec![
            PlatformSpec::new(
                "Instagram",
                "https://instagram.com/{handle}",
                true,
                "username",
            ),
            PlatformSpec::new("Twitter", "https://twitter.com/{handle}", true, "username"),
            PlatformSpec::new(
                "Facebook",
                "https://facebook.com/{handle}",
                true,
                "username",
            ),
            PlatformSpec::new("GitHub", "https://github.com/{handle}", true, "username"),
            PlatformSpec::new("YouTube", "https://youtube.com/@{handle}", true, "channel"),
            PlatformSpec::new("TikTok", "https://tiktok.com/@{handle}", true, "username"),
            PlatformSpec::new(
                "Snapchat",
                "https://snapchat.com/add/{handle}",
                true,
                "username",
            ),
            PlatformSpec::new(
                "LinkedIn",
                "https://linkedin.com/in/{handle}",
                false,
                "profile-name",
            ),
            PlatformSpec::new("WhatsApp", "https://wa.me/{handle}", false, "phone number"),
        ];

        Self {
            platforms: platforms.into(),
        }
    }

    /// Finds a platform by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&PlatformSpec> {
        let name = name.trim();
        self.platforms
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    /// All platforms in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &PlatformSpec> {
        self.platforms.iter()
    }

    /// Platforms whose links are generated from the global handle.
    pub fn auto_sync_platforms(&self) -> impl Iterator<Item = &PlatformSpec> {
        self.platforms.iter().filter(|spec| spec.auto_sync)
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
