//! Cache entry with insertion time and TTL

use std::time::{Duration, Instant};

/// A cache entry stamped with its insertion time
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value
    pub value: V,

    /// When the entry was inserted (monotonic clock)
    pub inserted_at: Instant,

    /// Maximum age before the entry is discarded
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Create a new entry inserted now
    pub fn new(value: V, ttl: Duration) -> Self {
        Self::inserted_at(value, ttl, Instant::now())
    }

    /// Create a new entry with an explicit insertion time
    pub fn inserted_at(value: V, ttl: Duration, inserted_at: Instant) -> Self {
        Self {
            value,
            inserted_at,
            ttl,
        }
    }

    /// Age of the entry at `now`
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    /// Get the age of the entry
    pub fn age(&self) -> Duration {
        self.age_at(Instant::now())
    }

    /// An entry is expired once its age exceeds its TTL
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.age_at(now) > self.ttl
    }

    /// Check if the entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Get time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.age())
    }
}
