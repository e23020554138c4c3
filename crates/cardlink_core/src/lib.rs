//! Core domain logic for CardLink digital business cards.
//! This crate owns slug uniqueness and social-link auto-sync invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod platform;
pub mod repo;
pub mod service;

pub use config::{ConfigError, HandleConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::profile::{CardDetails, CardId, OwnerId, Profile, ProfileId, SlugOwner};
pub use model::social_link::{LinkId, NewSocialLink, SocialLink};
pub use model::theme::{Layout, Theme};
pub use platform::link_generator::{LinkError, LinkGenerator};
pub use platform::registry::{PlatformRegistry, PlatformSpec, RegistryError};
pub use repo::profile_store::{ProfileStore, SqliteProfileStore, StoreError, StoreResult};
pub use service::auto_sync::{AutoSyncEngine, ReconciliationPlan};
pub use service::card_service::{
    CardService, CardServiceError, PublicCard, SaveCardRequest, SavedCard, SyncOutcome,
};
pub use service::slug_allocator::{
    normalize_handle, normalize_slug, HandleError, SlugAllocator, SlugAvailability,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
