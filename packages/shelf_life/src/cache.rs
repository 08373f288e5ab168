//! Bounded key/value cache with age-based lazy expiry.

use std::collections::HashMap;
use std::hash::Hash;
use std::mem;
use std::time::Duration;

use crate::pal::{Clock, ClockFacade};

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default maximum entry age.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 60);

/// A glorified map with a maximum size and a maximum entry age.
///
/// Two bounds keep the cache small and fresh:
///
/// * the entry count never exceeds the capacity - inserting into a full
///   cache evicts the least-recently-used entry first;
/// * entries older than the maximum age are treated as absent and removed
///   lazily when read - there is no background sweeper.
///
/// Reading an entry refreshes its place in the least-recently-used order
/// but not its age; only re-inserting resets the age.
///
/// Recency is tracked in a plain vector, so every insert and hit costs
/// O(len). Keep the capacity modest (the default is 100); an ordered-map
/// representation would be needed before pushing it into the thousands.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use shelf_life::Cache;
///
/// let mut cache = Cache::with_limits(2, Duration::from_secs(60));
///
/// cache.insert("a", 1);
/// cache.insert("b", 2);
/// cache.insert("c", 3); // evicts "a", the least recently used
///
/// assert_eq!(cache.get(&"a"), None);
/// assert_eq!(cache.get(&"c"), Some(&3));
/// ```
#[derive(Debug)]
pub struct Cache<K, V> {
    entries: HashMap<K, Entry<V>>,

    /// Keys in least-recently-used-first order. Linear scans; see the type
    /// docs for the complexity note.
    order: Vec<K>,

    capacity: usize,
    max_age: Duration,
    clock: ClockFacade,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Duration,
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache with the default capacity and maximum age.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_MAX_AGE)
    }

    /// Creates a cache bounded by the given capacity and maximum entry age.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_limits(capacity: usize, max_age: Duration) -> Self {
        assert!(capacity != 0, "Cache capacity cannot be zero");

        log::debug!("cache created with capacity {capacity} and max age {max_age:?}");

        Self {
            entries: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            capacity,
            max_age,
            clock: ClockFacade::real(),
        }
    }

    /// Creates a cache with a specific clock.
    ///
    /// This method is used for testing purposes to exercise expiry without
    /// real time passing.
    #[cfg(test)]
    pub(crate) fn with_clock(capacity: usize, max_age: Duration, clock: ClockFacade) -> Self {
        assert!(capacity != 0, "Cache capacity cannot be zero");

        Self {
            entries: HashMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            capacity,
            max_age,
            clock,
        }
    }

    /// Inserts a value, stamping its age and marking it most recently used.
    ///
    /// Returns the previous value if the key was already present (its age is
    /// reset). Inserting a new key into a full cache evicts the
    /// least-recently-used entry first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let now = self.clock.timestamp();

        if let Some(entry) = self.entries.get_mut(&key) {
            let previous = mem::replace(&mut entry.value, value);
            entry.inserted_at = now;
            self.touch(&key);
            return Some(previous);
        }

        if self.entries.len() >= self.capacity {
            self.evict_least_recently_used();
        }

        self.order.push(key.clone());
        self.entries.insert(key, Entry { value, inserted_at: now });

        None
    }

    /// Gets a value, treating entries older than the maximum age as absent.
    ///
    /// Expired entries are removed on the spot (lazy expiry); a hit marks
    /// the entry most recently used without resetting its age.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.is_alive(key) {
            self.forget(key);
            return None;
        }

        self.touch(key);

        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Whether an unexpired entry exists for the key.
    ///
    /// Takes `&mut self` because an expired entry is removed on the spot,
    /// like in [`get`](Self::get).
    pub fn contains_key(&mut self, key: &K) -> bool {
        if !self.is_alive(key) {
            self.forget(key);
            return false;
        }

        self.entries.contains_key(key)
    }

    /// Removes an entry, returning its value if one was present.
    ///
    /// An expired entry counts as absent.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let alive = self.is_alive(key);

        self.forget(key).and_then(|entry| alive.then_some(entry.value))
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// The number of stored entries.
    ///
    /// Expired entries that have not yet been read still count; expiry is
    /// lazy and only happens on access.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache stores no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The maximum entry age.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn is_alive(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|entry| {
            let age = self.clock.timestamp().saturating_sub(entry.inserted_at);
            age <= self.max_age
        })
    }

    /// Drops an entry from both the map and the recency order.
    fn forget(&mut self, key: &K) -> Option<Entry<V>> {
        if let Some(position) = self.order.iter().position(|candidate| candidate == key) {
            self.order.remove(position);
        }

        self.entries.remove(key)
    }

    /// Moves the key to the most-recently-used end of the order.
    fn touch(&mut self, key: &K) {
        if let Some(position) = self.order.iter().position(|candidate| candidate == key) {
            let key = self.order.remove(position);
            self.order.push(key);
        }
    }

    fn evict_least_recently_used(&mut self) {
        if self.order.is_empty() {
            return;
        }

        let victim = self.order.remove(0);
        self.entries.remove(&victim);

        log::trace!("evicted the least-recently-used entry to stay within capacity");
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
