//! Application context shared across all route handlers via Axum state.
//!
//! Everything here is built once at start-up and is read-only afterwards,
//! apart from the two transcode caches which synchronise internally.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rc_av::{HlsOutput, LegacyOutput, Transcoder};
use rc_core::config::Config;
use rc_core::{LibraryPath, MediaLibrary};
use rc_probe::Prober;

use crate::transcode_cache::TranscodeCache;

pub const HLS_MODE: &str = "hls";
pub const LEGACY_MODE: &str = "legacy";

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Catalog built by the start-up scan.
    pub library: Arc<MediaLibrary>,
    pub library_root: Arc<PathBuf>,
    pub prober: Arc<dyn Prober>,
    pub transcoder: Arc<dyn Transcoder>,
    pub hls_cache: Arc<TranscodeCache<HlsOutput>>,
    pub legacy_cache: Arc<TranscodeCache<LegacyOutput>>,
}

impl AppContext {
    /// Assemble a context, sizing both caches from `config.transcode`.
    pub fn new(
        config: Config,
        library: MediaLibrary,
        library_root: PathBuf,
        prober: Arc<dyn Prober>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let transcode = &config.transcode;
        let hls_cache = TranscodeCache::new(
            HLS_MODE,
            &transcode.cache_dir,
            transcode.hls_max_entries,
            transcode.cache_ttl(),
        );
        let legacy_cache = TranscodeCache::new(
            LEGACY_MODE,
            &transcode.cache_dir,
            transcode.legacy_max_entries,
            transcode.cache_ttl(),
        );

        Self {
            config: Arc::new(config),
            library: Arc::new(library),
            library_root: Arc::new(library_root),
            prober,
            transcoder,
            hls_cache: Arc::new(hls_cache),
            legacy_cache: Arc::new(legacy_cache),
        }
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Validate a client path and resolve it to a regular file in the library.
    pub async fn resolve_video(&self, raw: &str) -> rc_core::Result<(LibraryPath, PathBuf)> {
        let path = LibraryPath::parse(raw)?;
        let file = path.resolve_file(self.library_root()).await?;
        Ok((path, file))
    }

    /// Evict idle entries from both caches.
    pub async fn cleanup_caches(&self) -> usize {
        let removed =
            self.hls_cache.cleanup_expired().await + self.legacy_cache.cleanup_expired().await;
        if removed > 0 {
            tracing::info!(removed, "Evicted idle transcode artifacts");
        }
        removed
    }
}
