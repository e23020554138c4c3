//! Profile (business card) domain model.
//!
//! # Invariants
//! - `slug` is unique across all profiles; the store enforces this.
//! - `owner_id` owns at most one profile.
//! - `global_handle`, when set, is the canonical handle for auto-synced links.

use crate::model::theme::{Layout, Theme};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of the authenticated user owning a profile.
pub type OwnerId = Uuid;

/// Stable identifier of a profile row.
pub type ProfileId = Uuid;

/// Social links are keyed by the card they belong to; a card is a profile.
pub type CardId = ProfileId;

/// Card shape used when no shape has been chosen.
pub const DEFAULT_SHAPE: &str = "rectangle";

/// Free-form contact and presentation fields shown on the public card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDetails {
    /// Display name. Required on save.
    pub title: String,
    pub company: String,
    pub position: String,
    /// Short tagline rendered under the name.
    pub bio: String,
    pub phone: String,
    pub whatsapp: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub map_link: String,
    pub avatar_url: String,
}

/// Canonical profile record as persisted by a profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub owner_id: OwnerId,
    /// Public URL segment, already normalized and allocated.
    pub slug: String,
    /// Canonical handle driving auto-synced social links.
    pub global_handle: Option<String>,
    pub details: CardDetails,
    pub theme: Theme,
    pub layout: Layout,
    pub shape: String,
    pub is_published: bool,
}

impl Profile {
    /// Creates an unpublished profile with default presentation settings.
    pub fn new(owner_id: OwnerId, slug: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner_id, slug)
    }

    /// Creates a profile with a caller-provided stable ID.
    pub fn with_id(id: ProfileId, owner_id: OwnerId, slug: impl Into<String>) -> Self {
        Self {
            id,
            owner_id,
            slug: slug.into(),
            global_handle: None,
            details: CardDetails::default(),
            theme: Theme::default(),
            layout: Layout::default(),
            shape: DEFAULT_SHAPE.to_string(),
            is_published: false,
        }
    }

    /// Returns the canonical handle when it is set and not blank.
    pub fn canonical_handle(&self) -> Option<&str> {
        self.global_handle
            .as_deref()
            .map(str::trim)
            .filter(|handle| !handle.is_empty())
    }
}

/// Minimal projection returned by slug lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugOwner {
    pub id: ProfileId,
    pub owner_id: OwnerId,
}
