//! Domain model for business-card profiles and their social links.
//!
//! # Responsibility
//! - Define canonical data structures used by handle management.
//! - Give loosely stored presentation blobs (theme, layout) explicit shapes.
//!
//! # Invariants
//! - Every profile and link is identified by a stable UUID.
//! - A profile exclusively owns its social links.

pub mod profile;
pub mod social_link;
pub mod theme;
