//! rc-core: shared types, errors, configuration and path helpers.
//!
//! This crate is the foundational dependency for all other rc-* crates. It
//! owns the catalog data model produced by the scanner, the unified error
//! type used by every layer, the JSON configuration, and the helpers that
//! turn client-supplied paths into safe library paths and cache keys.

pub mod config;
pub mod error;
pub mod media;
pub mod paths;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
pub use paths::{CacheKey, LibraryPath};
