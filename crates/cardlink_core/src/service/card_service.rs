//! Card save flow and link management use-cases.
//!
//! # Responsibility
//! - Validate and persist a user's card with a uniquely allocated slug.
//! - Keep auto-synced social links consistent with the global handle.
//! - Expose manual link add/remove and the public card read.
//!
//! # Invariants
//! - Save order: validate -> allocate slug -> upsert -> delete stale
//!   auto-synced links -> insert new ones -> reload. No step overlaps.
//! - A storage-level slug conflict triggers exactly one re-allocation.
//! - Store I/O failures are propagated, never retried.

use crate::config::HandleConfig;
use crate::model::profile::{CardDetails, OwnerId, Profile, DEFAULT_SHAPE};
use crate::model::social_link::{LinkId, NewSocialLink, SocialLink};
use crate::model::theme::{Layout, Theme};
use crate::platform::registry::PlatformRegistry;
use crate::repo::profile_store::{ProfileStore, StoreError, StoreResult};
use crate::service::auto_sync::{append_start, AutoSyncEngine, ReconciliationPlan};
use crate::service::slug_allocator::{
    normalize_handle, normalize_slug, HandleError, SlugAllocator, SlugAvailability,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for card use-cases.
#[derive(Debug)]
pub enum CardServiceError {
    /// Card title is blank.
    InvalidTitle,
    /// Slug allocation or link generation failure.
    Handle(HandleError),
    /// Persistence-layer failure.
    Store(StoreError),
    /// Owner has no saved card yet.
    ProfileNotFound(OwnerId),
    /// Link does not exist on the owner's card.
    LinkNotFound(LinkId),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "card title must not be empty"),
            Self::Handle(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::ProfileNotFound(owner) => write!(f, "no card saved for owner {owner}"),
            Self::LinkNotFound(id) => write!(f, "social link not found: {id}"),
            Self::InconsistentState(details) => write!(f, "inconsistent card state: {details}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Handle(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HandleError> for CardServiceError {
    fn from(value: HandleError) -> Self {
        Self::Handle(value)
    }
}

impl From<StoreError> for CardServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::SlugTaken(slug) => Self::Handle(HandleError::SlugConflict(slug)),
            other => Self::Store(other),
        }
    }
}

/// Input of one save action from the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveCardRequest {
    /// Desired slug; normalized before allocation.
    pub slug: String,
    /// Desired global handle; normalized, blank disables auto-sync.
    pub global_handle: Option<String>,
    pub details: CardDetails,
    /// `None` keeps the stored theme (or the default for a new card).
    pub theme: Option<Theme>,
    pub layout: Option<Layout>,
    pub shape: Option<String>,
    pub is_published: bool,
}

/// Links of a card after an auto-sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Plan that was executed.
    pub plan: ReconciliationPlan,
    /// Reloaded links, ordered by `display_order`.
    pub links: Vec<SocialLink>,
}

/// Result of a save action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCard {
    pub profile: Profile,
    pub plan: ReconciliationPlan,
    pub links: Vec<SocialLink>,
}

/// Published card with its active links, for the public page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicCard {
    pub profile: Profile,
    pub links: Vec<SocialLink>,
}

/// Card use-case facade over a profile store.
pub struct CardService<S: ProfileStore> {
    store: S,
    config: HandleConfig,
    engine: AutoSyncEngine,
}

impl<S: ProfileStore> CardService<S> {
    /// Creates a service with default config and the builtin platform table.
    pub fn new(store: S) -> Self {
        Self::with_settings(store, HandleConfig::default(), PlatformRegistry::builtin())
    }

    pub fn with_settings(store: S, config: HandleConfig, registry: PlatformRegistry) -> Self {
        Self {
            store,
            config,
            engine: AutoSyncEngine::new(registry),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Probes whether `raw_slug` (normalized first) is free for `owner_id`.
    pub fn check_slug(&self, raw_slug: &str, owner_id: OwnerId) -> StoreResult<SlugAvailability> {
        self.allocator().check_availability(&normalize_slug(raw_slug), owner_id)
    }

    /// Saves the owner's card and re-syncs auto-synced links.
    pub fn save_card(
        &self,
        owner_id: OwnerId,
        request: &SaveCardRequest,
    ) -> Result<SavedCard, CardServiceError> {
        if request.details.title.trim().is_empty() {
            return Err(CardServiceError::InvalidTitle);
        }

        let base = normalize_slug(&request.slug);
        let handle = request
            .global_handle
            .as_deref()
            .map(normalize_handle)
            .filter(|value| !value.is_empty());

        let mut profile = match self.store.get_profile_by_owner(owner_id)? {
            Some(existing) => existing,
            None => Profile::new(owner_id, base.as_str()),
        };
        profile.global_handle = handle;
        profile.details = request.details.clone();
        if let Some(theme) = &request.theme {
            profile.theme = theme.clone();
        }
        if let Some(layout) = &request.layout {
            profile.layout = layout.clone();
        }
        profile.shape = request
            .shape
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SHAPE)
            .to_string();
        profile.is_published = request.is_published;

        let saved = self.persist_with_unique_slug(profile, &base)?;
        let outcome = self.sync_profile_links(&saved)?;

        info!(
            "event=card_save module=card status=ok owner={} card={} slug={} links={}",
            owner_id,
            saved.id,
            saved.slug,
            outcome.links.len()
        );
        Ok(SavedCard {
            profile: saved,
            plan: outcome.plan,
            links: outcome.links,
        })
    }

    /// Re-runs auto-sync for the owner's card against its stored handle.
    pub fn sync_social_links(&self, owner_id: OwnerId) -> Result<SyncOutcome, CardServiceError> {
        let profile = self.require_profile(owner_id)?;
        self.sync_profile_links(&profile)
    }

    /// Adds a manually entered link after every existing link.
    pub fn add_social_link(
        &self,
        owner_id: OwnerId,
        platform: &str,
        handle: &str,
    ) -> Result<SocialLink, CardServiceError> {
        let profile = self.require_profile(owner_id)?;
        let generator = self.engine.generator();
        let url = generator
            .generate(platform, handle)
            .map_err(HandleError::from)?;
        let platform_name = generator
            .registry()
            .get(platform)
            .map(|spec| spec.name.clone())
            .ok_or_else(|| HandleError::UnknownPlatform(platform.to_string()))?;

        let existing = self.store.list_social_links(profile.id)?;
        let display_order =
            append_start(existing.iter().map(|link| link.display_order).max(), 1)?;

        let link = NewSocialLink {
            platform: platform_name,
            handle: handle.trim().to_string(),
            url,
            is_auto_synced: false,
            display_order,
        };
        let mut inserted = self
            .store
            .insert_social_links(profile.id, std::slice::from_ref(&link))?;
        inserted.pop().ok_or(CardServiceError::InconsistentState(
            "inserted link missing from store response",
        ))
    }

    /// Removes one link from the owner's card.
    pub fn remove_social_link(
        &self,
        owner_id: OwnerId,
        link_id: LinkId,
    ) -> Result<(), CardServiceError> {
        let profile = self.require_profile(owner_id)?;
        let owned = self
            .store
            .list_social_links(profile.id)?
            .iter()
            .any(|link| link.id == link_id);
        if !owned {
            return Err(CardServiceError::LinkNotFound(link_id));
        }

        self.store.delete_social_links(&[link_id])?;
        Ok(())
    }

    /// Deletes the owner's card and, through the store, all of its links.
    pub fn delete_card(&self, owner_id: OwnerId) -> Result<(), CardServiceError> {
        let profile = self.require_profile(owner_id)?;
        self.store.delete_profile(profile.id)?;
        info!(
            "event=card_delete module=card status=ok owner={} card={}",
            owner_id, profile.id
        );
        Ok(())
    }

    /// Loads a published card by slug with its active links.
    pub fn load_public_card(&self, raw_slug: &str) -> StoreResult<Option<PublicCard>> {
        let slug = normalize_slug(raw_slug);
        let Some(profile) = self.store.get_published_profile_by_slug(&slug)? else {
            return Ok(None);
        };

        let links = self
            .store
            .list_social_links(profile.id)?
            .into_iter()
            .filter(|link| link.is_active)
            .collect();
        Ok(Some(PublicCard { profile, links }))
    }

    fn allocator(&self) -> SlugAllocator<&S> {
        SlugAllocator::new(&self.store, self.config.clone())
    }

    fn require_profile(&self, owner_id: OwnerId) -> Result<Profile, CardServiceError> {
        self.store
            .get_profile_by_owner(owner_id)?
            .ok_or(CardServiceError::ProfileNotFound(owner_id))
    }

    fn persist_with_unique_slug(
        &self,
        mut profile: Profile,
        base: &str,
    ) -> Result<Profile, CardServiceError> {
        let allocator = self.allocator();
        profile.slug = allocator.allocate(base, profile.owner_id)?;

        match self.store.upsert_profile(&profile) {
            Ok(saved) => Ok(saved),
            Err(StoreError::SlugTaken(slug)) => {
                warn!(
                    "event=card_save module=card status=retry error_code=slug_conflict slug={slug}"
                );
                profile.slug = allocator.allocate(base, profile.owner_id)?;
                Ok(self.store.upsert_profile(&profile)?)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn sync_profile_links(&self, profile: &Profile) -> Result<SyncOutcome, CardServiceError> {
        let current = self.store.list_social_links(profile.id)?;
        let plan = self.engine.reconcile(
            profile.owner_id,
            profile.id,
            profile.canonical_handle().unwrap_or_default(),
            &current,
        )?;
        self.engine.apply(&self.store, profile.id, &plan)?;

        let links = if plan.is_empty() {
            current
        } else {
            self.store.list_social_links(profile.id)?
        };
        Ok(SyncOutcome { plan, links })
    }
}
