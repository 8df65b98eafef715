//! The [`Prober`] trait defining the interface for media file probing.

use std::path::Path;

use async_trait::async_trait;

use crate::types::ProbeReport;

/// A media file prober capable of extracting format and stream metadata.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
#[async_trait]
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe the file at `path`.
    ///
    /// Returns [`rc_core::Error::Probe`] when the tool produces no usable
    /// output; partial data is never substituted.
    async fn probe(&self, path: &Path) -> rc_core::Result<ProbeReport>;
}
