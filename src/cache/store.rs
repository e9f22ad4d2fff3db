//! Bounded cache store with TTL expiry and oldest-first eviction

use crate::cache::{
    config::CacheConfig,
    entry::CacheEntry,
    types::{CacheKey, CacheStats},
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Capacity- and time-bounded key/value cache
///
/// - Thread-safe: all state sits behind one mutex, critical sections are a
///   single map operation and never await.
/// - `get` on an entry older than its TTL removes it and reports a miss.
/// - When full, `insert` evicts exactly one entry: the one inserted longest
///   ago. Reads do not refresh an entry's position.
pub struct BoundedCache<V> {
    config: CacheConfig,
    store: Mutex<CacheStore<V>>,
}

/// Internal cache storage
struct CacheStore<V> {
    /// Main storage: key -> entry
    entries: HashMap<CacheKey, CacheEntry<V>>,

    /// Keys in insertion order, oldest at the front
    insertion_order: VecDeque<CacheKey>,

    /// Current cache statistics
    stats: CacheStats,
}

impl<V> CacheStore<V> {
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.insertion_order.retain(|k| k != key);
        self.stats.entries = self.entries.len();
        Some(entry)
    }
}

impl<V: Clone> BoundedCache<V> {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        debug!(
            "Initializing bounded cache (max_entries: {}, ttl: {:?})",
            config.max_entries, config.default_ttl
        );

        let store = CacheStore {
            entries: HashMap::with_capacity(config.max_entries),
            insertion_order: VecDeque::with_capacity(config.max_entries),
            stats: CacheStats::default(),
        };

        Self {
            config,
            store: Mutex::new(store),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore<V>> {
        // A panic while holding the lock cannot leave the map half-updated in a
        // way that breaks the capacity bound, so keep serving.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a value from the cache
    pub fn get(&self, key: &str) -> Option<V> {
        let mut store = self.lock();

        let expired = match store.entries.get(key) {
            None => {
                if self.config.enable_metrics {
                    store.stats.misses += 1;
                }
                return None;
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            debug!("Cache entry expired: {}", key);
            store.remove_entry(key);
            if self.config.enable_metrics {
                store.stats.misses += 1;
                store.stats.evictions_ttl += 1;
            }
            return None;
        }

        if self.config.enable_metrics {
            store.stats.hits += 1;
        }
        store.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert a value, evicting the oldest entry first when the cache is full
    ///
    /// Replacing an existing key does not evict anything; the entry gets a
    /// fresh insertion time and moves to the back of the eviction order.
    pub fn insert(&self, key: impl Into<CacheKey>, value: V) {
        let key = key.into();
        let entry = CacheEntry::new(value, self.config.ttl_with_jitter());
        let mut store = self.lock();

        if store.entries.contains_key(&key) {
            debug!("Updating existing cache entry: {}", key);
            store.insertion_order.retain(|k| k != &key);
        } else if store.entries.len() >= self.config.max_entries {
            if let Some(oldest) = store.insertion_order.pop_front() {
                debug!("Evicting oldest cache entry: {}", oldest);
                store.entries.remove(&oldest);
                if self.config.enable_metrics {
                    store.stats.evictions_capacity += 1;
                }
            }
        }

        store.entries.insert(key.clone(), entry);
        store.insertion_order.push_back(key);
        store.stats.entries = store.entries.len();
    }

    /// Check if a live key exists (no side effects, no stats)
    pub fn contains_key(&self, key: &str) -> bool {
        let store = self.lock();
        store
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Remove a specific entry from the cache
    pub fn remove(&self, key: &str) -> Option<V> {
        self.lock().remove_entry(key).map(|entry| entry.value)
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        let mut store = self.lock();
        let count = store.entries.len();
        store.entries.clear();
        store.insertion_order.clear();
        store.stats.entries = 0;
        info!("Cleared {} entries from cache", count);
    }

    /// Remove all expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut store = self.lock();
        let expired: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            store.remove_entry(key);
        }
        if self.config.enable_metrics {
            store.stats.evictions_ttl += expired.len() as u64;
        }

        if !expired.is_empty() {
            debug!("Purged {} expired entries", expired.len());
        }
        expired.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    /// Get number of entries in cache (expired entries included until touched)
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.config.max_entries
    }
}
