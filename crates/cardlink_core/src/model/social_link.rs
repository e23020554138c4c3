//! Social link domain model.
//!
//! # Invariants
//! - `url` is always derived from `(platform, handle)` by the link generator.
//! - Auto-synced links are replaced wholesale when the canonical handle
//!   changes; manual links are never touched by reconciliation.

use crate::model::profile::CardId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a social link row.
pub type LinkId = Uuid;

/// Persisted social link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: LinkId,
    pub card_id: CardId,
    /// Registry platform name, e.g. `Instagram`.
    pub platform: String,
    pub handle: String,
    pub url: String,
    pub is_auto_synced: bool,
    pub is_active: bool,
    pub display_order: i64,
}

/// Link waiting to be inserted; identity is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSocialLink {
    pub platform: String,
    pub handle: String,
    pub url: String,
    pub is_auto_synced: bool,
    pub display_order: i64,
}

impl SocialLink {
    /// Returns whether the link points at the same target as `other`.
    pub fn same_target(&self, other: &NewSocialLink) -> bool {
        self.platform == other.platform && self.handle == other.handle && self.url == other.url
    }
}
