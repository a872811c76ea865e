//! Session cache for generated images.
//!
//! [`ImageCache`] maps a [`CacheKey`] to the [`ImagePayload`] the provider
//! produced for it. Entries live for the lifetime of the cache (one
//! session): nothing is invalidated, refreshed or written to disk. Only
//! successful generations are inserted, so a failure never poisons a key.
//!
//! # Architecture
//!
//! The cache is owned by [`GenerationClient`](crate::generation::GenerationClient)
//! and shared by everything holding a clone of that client. It sits above
//! the quota guard check and below the provider call:
//!
//! ```text
//! guard tripped? ─yes─> None
//!      │no
//! cache hit? ─yes─> cached payload
//!      │no
//! provider ─ok─> insert ─> payload
//! ```
//!
//! Growth is bounded in practice by the number of distinct catalog items a
//! session touches. [`CacheConfig::max_entries`] exists for long-running
//! hosts that want a hard cap; the default is unbounded.

mod key;

pub use key::CacheKey;

use moka::future::Cache;

use crate::telemetry;
use crate::types::ImagePayload;

/// Configuration for the image cache.
///
/// ```rust
/// # use aerogen::CacheConfig;
/// let config = CacheConfig::new().max_entries(500);
/// assert_eq!(config.max_entries, Some(500));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum number of cached images. Default: unbounded.
    pub max_entries: Option<u64>,
}

impl CacheConfig {
    /// Create a new config with the session defaults (unbounded, no expiry).
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of cached images (LRU eviction beyond the cap).
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = Some(n);
        self
    }
}

/// In-memory, session-lifetime store of generated images.
pub struct ImageCache {
    entries: Cache<CacheKey, ImagePayload>,
}

impl ImageCache {
    /// Create a new image cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder();
        if let Some(max) = config.max_entries {
            builder = builder.max_capacity(max);
        }
        Self {
            entries: builder.build(),
        }
    }

    /// Look up a cached image.
    ///
    /// Returns `None` on cache miss. Emits cache hit/miss metrics.
    pub async fn get(&self, key: &CacheKey) -> Option<ImagePayload> {
        match self.entries.get(key).await {
            Some(payload) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(payload)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Insert (or overwrite) a generated image.
    pub async fn insert(&self, key: CacheKey, payload: ImagePayload) {
        self.entries.insert(key, payload).await;
    }

    /// Whether a key is cached, without touching hit/miss metrics.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached images.
    ///
    /// moka applies writes lazily; call after
    /// [`run_pending_tasks`](Self::run_pending_tasks) for an exact count.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush moka's pending maintenance so counts are exact.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}
