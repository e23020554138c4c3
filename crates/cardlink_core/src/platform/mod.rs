//! Social platform registry and URL generation.
//!
//! # Responsibility
//! - Hold the fixed table of supported platforms as an injected value.
//! - Map `(platform, handle)` pairs to canonical profile URLs.

pub mod link_generator;
pub mod registry;
