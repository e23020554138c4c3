//! Core use-case services.
//!
//! # Responsibility
//! - Allocate unique public slugs and keep auto-synced links consistent.
//! - Orchestrate the card save flow over a `ProfileStore`.
//!
//! # Invariants
//! - Services stay storage-agnostic; all persistence goes through the store.
//! - Within one save, steps run strictly in sequence.

pub mod auto_sync;
pub mod card_service;
pub mod slug_allocator;
