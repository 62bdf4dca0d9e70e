//! Accessor-chain cache.
//!
//! Entity metadata never changes for the lifetime of the process, so a path
//! resolved once for a type can be reused by every later request. Chains are
//! keyed by the entity's `TypeId` and the raw path string.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::trace;

use super::path::{resolve, AccessorChain, ResolveError};
use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::reflect::Reflect;

/// Cache key: entity type plus raw field path.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct ChainKey {
    entity: TypeId,
    path: String,
}

impl ChainKey {
    fn of<T: Reflect>(path: &str) -> Self {
        Self {
            entity: TypeId::of::<T>(),
            path: path.to_string(),
        }
    }
}

/// Cached chain with its hit counter.
#[derive(Debug)]
pub struct CachedChain {
    /// The resolved chain.
    pub chain: Arc<AccessorChain>,
    /// Number of cache hits for this chain.
    pub hit_count: AtomicU64,
}

impl CachedChain {
    fn new(chain: Arc<AccessorChain>) -> Self {
        Self {
            chain,
            hit_count: AtomicU64::new(0),
        }
    }

    /// Increment the hit count and return the new value.
    pub fn record_hit(&self) -> u64 {
        self.hit_count.fetch_add(1, AtomicOrdering::Relaxed) + 1
    }

    /// Get the current hit count.
    pub fn hits(&self) -> u64 {
        self.hit_count.load(AtomicOrdering::Relaxed)
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Get hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Get miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Get eviction count.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(AtomicOrdering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Bounded, thread-safe cache of resolved field paths.
///
/// Reads take a shared lock; a miss resolves outside any lock and then
/// inserts under the write lock. When two threads miss on the same key the
/// first inserted chain is kept. Failed resolutions are never cached.
pub struct ChainCache {
    entries: RwLock<HashMap<ChainKey, CachedChain>>,
    max_entries: usize,
    stats: CacheStats,
}

impl ChainCache {
    /// Create a cache holding at most `max_entries` chains.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
            stats: CacheStats::default(),
        }
    }

    /// Process-wide cache shared by engines configured to use it.
    pub fn global() -> Arc<ChainCache> {
        static GLOBAL: OnceLock<Arc<ChainCache>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(ChainCache::new(DEFAULT_CACHE_CAPACITY)))
            .clone()
    }

    /// Resolve `path` against `T`, reusing a cached chain when present.
    pub fn resolve<T: Reflect>(&self, path: &str) -> Result<Arc<AccessorChain>, ResolveError> {
        let key = ChainKey::of::<T>(path);

        if let Some(cached) = self.entries.read().get(&key) {
            cached.record_hit();
            self.stats.hits.fetch_add(1, AtomicOrdering::Relaxed);
            return Ok(cached.chain.clone());
        }
        self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);

        let chain = Arc::new(resolve::<T>(path)?);
        trace!(path = %path, entity = chain.entity(), "resolved field path");

        let mut guard = self.entries.write();
        if let Some(existing) = guard.get(&key) {
            return Ok(existing.chain.clone());
        }
        if guard.len() >= self.max_entries {
            self.evict_least_used(&mut guard);
        }
        guard.insert(key, CachedChain::new(chain.clone()));
        Ok(chain)
    }

    /// Evict the entry with the fewest hits.
    fn evict_least_used(&self, entries: &mut HashMap<ChainKey, CachedChain>) {
        let evict_key = entries
            .iter()
            .min_by_key(|(_, v)| v.hits())
            .map(|(k, _)| k.clone());

        if let Some(key) = evict_key {
            entries.remove(&key);
            self.stats.evictions.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Get the current number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for ChainCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for ChainCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainCache")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .field("stats", &self.stats)
            .finish()
    }
}
