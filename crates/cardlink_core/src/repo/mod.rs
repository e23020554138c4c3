//! Profile store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the capability set handle management needs from storage.
//! - Isolate SQLite query details from allocation and sync logic.
//!
//! # Invariants
//! - The store is the sole writer of durable state.
//! - A write violating slug uniqueness surfaces as `StoreError::SlugTaken`.

pub mod profile_store;
