//! A bounded key/value cache with age-based expiry and least-recently-used
//! eviction.
//!
//! [`Cache`] is a glorified map with two freshness bounds: it never grows
//! beyond its capacity (the least-recently-used entry is evicted first) and
//! entries never outlive their maximum age (expired entries are removed
//! lazily when read - there is no background sweeper).
//!
//! Suitable for memoizing cheap-to-recompute derived values, such as
//! formatted names or parsed settings, where bounded staleness is fine.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use shelf_life::Cache;
//!
//! let mut cache = Cache::with_limits(100, Duration::from_secs(60));
//!
//! cache.insert("user:42", "Jane".to_string());
//! assert_eq!(cache.get(&"user:42").map(String::as_str), Some("Jane"));
//! assert_eq!(cache.get(&"user:7"), None);
//! ```

mod cache;
mod pal;

pub use cache::{Cache, DEFAULT_CAPACITY, DEFAULT_MAX_AGE};
