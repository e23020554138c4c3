//! Auto-sync of social links from one canonical handle.
//!
//! # Responsibility
//! - Compute the link set implied by a canonical handle.
//! - Diff it against stored links into a delete/insert plan.
//! - Execute plans against a `ProfileStore`.
//!
//! # Invariants
//! - Only `is_auto_synced` links are ever deleted; manual links are untouched,
//!   even when they share a platform with an auto-synced one.
//! - A changed auto-synced set is replaced wholesale, never patched.
//! - New auto-synced links are appended after the highest manual order.
//! - Plans execute as delete batch then insert batch; a failure in between
//!   leaves no auto-synced links rather than stale ones.

use crate::model::profile::{CardId, OwnerId};
use crate::model::social_link::{LinkId, NewSocialLink, SocialLink};
use crate::platform::link_generator::LinkGenerator;
use crate::platform::registry::PlatformRegistry;
use crate::repo::profile_store::{ProfileStore, StoreResult};
use crate::service::slug_allocator::HandleError;
use log::{error, info};

/// Delete/insert operations that bring a card's auto-synced links in line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub to_delete: Vec<LinkId>,
    pub to_insert: Vec<NewSocialLink>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_insert.is_empty()
    }
}

/// Stateless reconciliation engine over an injected platform registry.
#[derive(Debug, Clone, Default)]
pub struct AutoSyncEngine {
    generator: LinkGenerator,
}

impl AutoSyncEngine {
    pub fn new(registry: PlatformRegistry) -> Self {
        Self {
            generator: LinkGenerator::new(registry),
        }
    }

    pub fn generator(&self) -> &LinkGenerator {
        &self.generator
    }

    /// Plans the auto-synced link set of `card_id` for `canonical_handle`.
    ///
    /// - Blank handle: delete every auto-synced link, insert nothing.
    /// - Stored auto-synced set already equals the generated set: empty plan.
    /// - Otherwise: delete every auto-synced link and insert one link per
    ///   eligible platform, in registry order.
    ///
    /// Links of other cards in `current_links` are ignored.
    pub fn reconcile(
        &self,
        owner_id: OwnerId,
        card_id: CardId,
        canonical_handle: &str,
        current_links: &[SocialLink],
    ) -> Result<ReconciliationPlan, HandleError> {
        let card_links: Vec<&SocialLink> = current_links
            .iter()
            .filter(|link| link.card_id == card_id)
            .collect();
        let (auto_links, manual_links): (Vec<&SocialLink>, Vec<&SocialLink>) =
            card_links.into_iter().partition(|link| link.is_auto_synced);

        let handle = canonical_handle.trim();
        let desired = if handle.is_empty() {
            Vec::new()
        } else {
            self.generate_links(handle)?
        };

        if same_link_set(&auto_links, &desired) {
            info!(
                "event=auto_sync_plan module=handle status=noop owner={owner_id} card={card_id}"
            );
            return Ok(ReconciliationPlan::default());
        }

        let first_order = append_start(
            manual_links.iter().map(|link| link.display_order).max(),
            desired.len(),
        )?;
        let to_insert = desired
            .into_iter()
            .zip(first_order..)
            .map(|(link, display_order)| NewSocialLink {
                display_order,
                ..link
            })
            .collect::<Vec<_>>();
        let to_delete = auto_links.iter().map(|link| link.id).collect::<Vec<_>>();

        info!(
            "event=auto_sync_plan module=handle status=ok owner={} card={} delete={} insert={} kept_manual={}",
            owner_id,
            card_id,
            to_delete.len(),
            to_insert.len(),
            manual_links.len()
        );
        Ok(ReconciliationPlan {
            to_delete,
            to_insert,
        })
    }

    /// Executes `plan` as a delete batch followed by an insert batch.
    ///
    /// Returns the inserted rows with store-assigned ids.
    pub fn apply<S: ProfileStore>(
        &self,
        store: &S,
        card_id: CardId,
        plan: &ReconciliationPlan,
    ) -> StoreResult<Vec<SocialLink>> {
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        store.delete_social_links(&plan.to_delete)?;
        match store.insert_social_links(card_id, &plan.to_insert) {
            Ok(inserted) => {
                info!(
                    "event=auto_sync_apply module=handle status=ok card={} deleted={} inserted={}",
                    card_id,
                    plan.to_delete.len(),
                    inserted.len()
                );
                Ok(inserted)
            }
            Err(err) => {
                error!(
                    "event=auto_sync_apply module=handle status=error error_code=insert_failed card={} deleted={} error={}",
                    card_id,
                    plan.to_delete.len(),
                    err
                );
                Err(err)
            }
        }
    }

    fn generate_links(&self, handle: &str) -> Result<Vec<NewSocialLink>, HandleError> {
        self.generator
            .registry()
            .auto_sync_platforms()
            .map(|spec| -> Result<NewSocialLink, HandleError> {
                let url = self.generator.generate(&spec.name, handle)?;
                Ok(NewSocialLink {
                    platform: spec.name.clone(),
                    handle: handle.to_string(),
                    url,
                    is_auto_synced: true,
                    display_order: 0,
                })
            })
            .collect()
    }
}

/// First `display_order` for `count` links appended after `highest`.
///
/// Fails when the last appended order would not fit in `i64`.
pub(crate) fn append_start(highest: Option<i64>, count: usize) -> Result<i64, HandleError> {
    let Some(highest) = highest else {
        return Ok(0);
    };
    let last_offset = i64::try_from(count.max(1)).ok();
    highest
        .checked_add(1)
        .filter(|first| last_offset.and_then(|n| first.checked_add(n - 1)).is_some())
        .ok_or(HandleError::DisplayOrderOverflow { after: highest })
}

fn same_link_set(current: &[&SocialLink], desired: &[NewSocialLink]) -> bool {
    if current.len() != desired.len() {
        return false;
    }

    let mut unmatched: Vec<&SocialLink> = current.to_vec();
    for wanted in desired {
        match unmatched.iter().position(|link| link.same_target(wanted)) {
            Some(index) => {
                unmatched.swap_remove(index);
            }
            None => return false,
        }
    }
    unmatched.is_empty()
}
