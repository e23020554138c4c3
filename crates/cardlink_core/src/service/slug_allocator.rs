//! Slug allocation and handle normalization.
//!
//! # Responsibility
//! - Resolve a desired base slug to one not held by another owner.
//! - Normalize raw slug/handle input into the allowed character classes.
//!
//! # Invariants
//! - Candidates are probed in order `base`, `base1`, `base2`, ...
//! - The probe is advisory; the store's UNIQUE index on slug is the
//!   correctness backstop and surfaces races as `SlugConflict`.
//! - The allocator never writes.

use crate::config::HandleConfig;
use crate::model::profile::OwnerId;
use crate::platform::link_generator::LinkError;
use crate::repo::profile_store::{ProfileStore, StoreError, StoreResult};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static SLUG_DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9-]+").expect("valid slug regex"));
static HANDLE_DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]+").expect("valid handle regex"));

/// Errors raised by slug allocation and social-link auto-sync.
#[derive(Debug)]
pub enum HandleError {
    /// Slug is empty or shorter than the configured minimum.
    InvalidSlug { slug: String, min_len: usize },
    /// The store rejected the slug as already taken.
    SlugConflict(String),
    /// No free candidate within the attempt cap.
    SlugAllocationExhausted { base: String, attempts: u32 },
    /// Platform missing from the registry.
    UnknownPlatform(String),
    /// Handle is empty after trimming.
    InvalidHandle,
    /// Appending links after `after` would overflow `display_order`.
    DisplayOrderOverflow { after: i64 },
    Store(StoreError),
}

impl Display for HandleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSlug { slug, min_len } => write!(
                f,
                "invalid slug `{slug}`: must be at least {min_len} characters"
            ),
            Self::SlugConflict(slug) => {
                write!(f, "slug `{slug}` is already taken, try a different name")
            }
            Self::SlugAllocationExhausted { base, attempts } => write!(
                f,
                "no free slug for `{base}` after {attempts} attempts"
            ),
            Self::UnknownPlatform(name) => write!(f, "unknown platform: {name}"),
            Self::InvalidHandle => write!(f, "handle must not be empty"),
            Self::DisplayOrderOverflow { after } => {
                write!(f, "cannot append links after display order {after}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HandleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for HandleError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::SlugTaken(slug) => Self::SlugConflict(slug),
            other => Self::Store(other),
        }
    }
}

impl From<LinkError> for HandleError {
    fn from(value: LinkError) -> Self {
        match value {
            LinkError::UnknownPlatform(name) => Self::UnknownPlatform(name),
            LinkError::EmptyHandle => Self::InvalidHandle,
        }
    }
}

/// Result of a live availability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugAvailability {
    Available,
    Taken,
    TooShort,
}

/// Finds free slugs by probing the profile store.
pub struct SlugAllocator<S: ProfileStore> {
    store: S,
    config: HandleConfig,
}

impl<S: ProfileStore> SlugAllocator<S> {
    pub fn new(store: S, config: HandleConfig) -> Self {
        Self { store, config }
    }

    /// Returns `desired_base` or the first suffixed variant free for `owner_id`.
    ///
    /// A slug already held by `owner_id` counts as free, so re-saving a
    /// profile keeps its slug.
    ///
    /// # Errors
    /// - `InvalidSlug` when `desired_base` is shorter than `min_slug_len`.
    /// - `SlugAllocationExhausted` when `max_slug_attempts` candidates are taken.
    /// - `Store` for lookup failures, unmodified.
    pub fn allocate(&self, desired_base: &str, owner_id: OwnerId) -> Result<String, HandleError> {
        self.ensure_min_len(desired_base)?;

        for attempt in 0..self.config.max_slug_attempts {
            let candidate = if attempt == 0 {
                desired_base.to_string()
            } else {
                format!("{desired_base}{attempt}")
            };

            if self.is_free_for(&candidate, owner_id)? {
                info!(
                    "event=slug_allocate module=handle status=ok base={} slug={} attempts={}",
                    desired_base,
                    candidate,
                    attempt + 1
                );
                return Ok(candidate);
            }
            debug!("event=slug_allocate module=handle status=taken candidate={candidate}");
        }

        warn!(
            "event=slug_allocate module=handle status=error error_code=slug_exhausted base={} attempts={}",
            desired_base, self.config.max_slug_attempts
        );
        Err(HandleError::SlugAllocationExhausted {
            base: desired_base.to_string(),
            attempts: self.config.max_slug_attempts,
        })
    }

    /// Checks whether `slug` could be saved by `owner_id` as-is.
    pub fn check_availability(
        &self,
        slug: &str,
        owner_id: OwnerId,
    ) -> StoreResult<SlugAvailability> {
        if slug.chars().count() < self.config.min_slug_len {
            return Ok(SlugAvailability::TooShort);
        }
        if self.is_free_for(slug, owner_id)? {
            Ok(SlugAvailability::Available)
        } else {
            Ok(SlugAvailability::Taken)
        }
    }

    fn is_free_for(&self, slug: &str, owner_id: OwnerId) -> StoreResult<bool> {
        let holders = self.store.find_profiles_by_slug(slug)?;
        Ok(holders.iter().all(|holder| holder.owner_id == owner_id))
    }

    fn ensure_min_len(&self, slug: &str) -> Result<(), HandleError> {
        if slug.is_empty() || slug.chars().count() < self.config.min_slug_len {
            return Err(HandleError::InvalidSlug {
                slug: slug.to_string(),
                min_len: self.config.min_slug_len,
            });
        }
        Ok(())
    }
}

/// Lowercases and strips everything outside `[a-z0-9-]`.
pub fn normalize_slug(raw: &str) -> String {
    SLUG_DISALLOWED_RE
        .replace_all(&raw.trim().to_lowercase(), "")
        .into_owned()
}

/// Lowercases and strips everything outside `[a-z0-9_]`.
pub fn normalize_handle(raw: &str) -> String {
    HANDLE_DISALLOWED_RE
        .replace_all(&raw.trim().to_lowercase(), "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::{normalize_handle, normalize_slug};

    #[test]
    fn slug_keeps_dashes_and_drops_underscores() {
        assert_eq!(normalize_slug("  Jane_Doe-Design!  "), "janedoe-design");
    }

    #[test]
    fn handle_keeps_underscores_and_drops_dashes() {
        assert_eq!(normalize_handle("@Jane_Doe-99"), "jane_doe99");
    }

    #[test]
    fn non_ascii_input_normalizes_to_empty() {
        assert_eq!(normalize_slug("ÄÖÜ"), "");
    }
}
