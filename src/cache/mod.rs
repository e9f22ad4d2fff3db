//! # Bounded Caching Layer
//!
//! Generic capacity- and time-bounded key/value caches used throughout the
//! resolver: resolved recipes, raw remote responses, extracted names and the
//! fuzzy matcher's memo table.
//!
//! ## Semantics
//!
//! - **TTL**: an entry older than its time-to-live is never returned; touching
//!   it removes it.
//! - **Capacity**: inserting into a full cache evicts exactly one entry, the
//!   oldest by insertion time. Reads do not affect eviction order.
//! - **Thread safety**: one mutex per cache around short map operations.
//!
//! ## Example
//!
//! ```rust
//! use recipe_resolver::cache::{BoundedCache, CacheConfig};
//! use std::time::Duration;
//!
//! let config = CacheConfig::builder()
//!     .default_ttl(Duration::from_secs(3600))
//!     .max_entries(100)
//!     .build();
//!
//! let cache: BoundedCache<String> = BoundedCache::new(config);
//! cache.insert("butter chicken", "Butter Chicken".to_string());
//!
//! if let Some(value) = cache.get("butter chicken") {
//!     println!("Cache hit: {}", value);
//! }
//! ```

pub mod config;
pub mod entry;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use store::BoundedCache;
pub use types::{CacheKey, CacheStats};
