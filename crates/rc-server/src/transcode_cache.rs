//! Single-flight cache for generated playback artifacts.
//!
//! One [`TranscodeCache`] exists per generated mode (HLS, legacy). Requests
//! for a key that is already cached are served immediately; the first request
//! for an uncached key becomes the leader and runs the generator in a spawned
//! task, while every concurrent request for the same key waits on the
//! leader's in-flight marker. Unrelated keys never wait on each other.
//!
//! A failed generation is reported to the leader and all waiters, and leaves
//! the key uncached so the next request retries.
//!
//! Entries are bounded by count (least recently accessed is evicted on insert)
//! and optionally by idle time ([`TranscodeCache::cleanup_expired`]). Evicting
//! an entry deletes `<cache_dir>/<mode>/<key>`, never a path the generator
//! reported.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rc_core::{CacheKey, Error, Result};
use tokio::sync::watch;

type Shared<T> = std::result::Result<Arc<T>, Arc<Error>>;
type Marker<T> = watch::Receiver<Option<Shared<T>>>;

struct CacheEntry<T> {
    value: Arc<T>,
    last_accessed: Instant,
}

/// Single-flight, size- and age-bounded artifact cache.
pub struct TranscodeCache<T> {
    mode: &'static str,
    root: PathBuf,
    max_entries: usize,
    ttl: Option<Duration>,
    entries: DashMap<CacheKey, CacheEntry<T>>,
    in_flight: DashMap<CacheKey, Marker<T>>,
    generations: AtomicU64,
}

impl<T: Send + Sync + 'static> TranscodeCache<T> {
    /// Create a cache writing artifacts under `<cache_dir>/<mode>/<key>`.
    ///
    /// `max_entries` below 1 is treated as 1; `ttl` of `None` disables
    /// age-based eviction.
    pub fn new(
        mode: &'static str,
        cache_dir: &Path,
        max_entries: usize,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            mode,
            root: cache_dir.join(mode),
            max_entries: max_entries.max(1),
            ttl,
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            generations: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> &'static str {
        self.mode
    }

    /// Deterministic artifact directory for `key`.
    pub fn artifact_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Return the cached artifact for `key`, generating it at most once.
    ///
    /// `generate` receives the (empty) artifact directory. It runs in its own
    /// task, so dropping the returned future does not cancel generation.
    pub async fn get_or_generate<F, Fut>(self: &Arc<Self>, key: &CacheKey, generate: F) -> Result<Arc<T>>
    where
        F: FnOnce(PathBuf) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        let mut marker = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(e) => {
                tracing::debug!(mode = self.mode, key = %key, "Waiting on in-flight generation");
                e.get().clone()
            }
            Entry::Vacant(e) => {
                // The leader publishes the entry before clearing its marker,
                // so a finished generation is visible here.
                if let Some(hit) = self.get(key) {
                    return Ok(hit);
                }
                let (tx, rx) = watch::channel(None);
                e.insert(rx.clone());
                self.spawn_generation(key.clone(), tx, generate);
                rx
            }
        };

        let outcome = match marker.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        };

        match outcome {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(e.replicate()),
            None => Err(Error::Internal(format!(
                "{} generation for {key} ended without a result",
                self.mode
            ))),
        }
    }

    fn spawn_generation<F, Fut>(
        self: &Arc<Self>,
        key: CacheKey,
        tx: watch::Sender<Option<Shared<T>>>,
        generate: F,
    ) where
        F: FnOnce(PathBuf) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = cache.run_generation(&key, generate).await;

            let shared = match outcome {
                Ok(value) => {
                    let value = Arc::new(value);
                    cache.insert(key.clone(), Arc::clone(&value)).await;
                    tracing::info!(
                        mode = cache.mode,
                        key = %key,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Generation complete"
                    );
                    Ok(value)
                }
                Err(e) => {
                    tracing::warn!(mode = cache.mode, key = %key, error = %e, "Generation failed");
                    Err(Arc::new(e))
                }
            };

            tx.send_replace(Some(shared));
            cache.in_flight.remove(&key);
        });
    }

    async fn run_generation<F, Fut>(&self, key: &CacheKey, generate: F) -> Result<T>
    where
        F: FnOnce(PathBuf) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let dir = self.artifact_dir(key);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::debug!(dir = %dir.display(), "Removed stale artifacts"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.generations.fetch_add(1, Ordering::SeqCst);

        // A panicking generator surfaces as a JoinError instead of leaving
        // waiters without a result.
        match tokio::spawn(generate(dir)).await {
            Ok(result) => result,
            Err(e) => Err(Error::generation(self.mode, format!("generator task failed: {e}"))),
        }
    }

    /// Cached artifact for `key`, refreshing its access time.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        self.entries.get_mut(key).map(|mut entry| {
            entry.last_accessed = Instant::now();
            Arc::clone(&entry.value)
        })
    }

    async fn insert(&self, key: CacheKey, value: Arc<T>) {
        while !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if !self.evict_oldest().await {
                break;
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                last_accessed: Instant::now(),
            },
        );
    }

    async fn evict_oldest(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_accessed)
            .map(|entry| entry.key().clone());

        match oldest {
            Some(key) => {
                tracing::debug!(mode = self.mode, key = %key, "Evicting least recently used artifact");
                self.remove(&key).await;
                true
            }
            None => false,
        }
    }

    /// Drop an entry and delete its artifact directory. Returns whether it
    /// existed.
    pub async fn remove(&self, key: &CacheKey) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }
        remove_artifacts(&self.artifact_dir(key)).await;
        true
    }

    /// Evict entries idle for longer than the TTL. Returns the count removed.
    pub async fn cleanup_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let now = Instant::now();
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|entry| now.duration_since(entry.last_accessed) >= ttl)
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in &expired {
            if self.remove(key).await {
                removed += 1;
            }
        }
        removed
    }

    /// Number of generator invocations since construction.
    pub fn generation_count(&self) -> u64 {
        self.generations.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn remove_artifacts(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "Failed to remove artifacts"),
    }
}
