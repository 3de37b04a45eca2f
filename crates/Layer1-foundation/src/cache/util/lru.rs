//! Lightweight LRU Cache implementation
//!
//! Minimal dependencies, 서버 결과 캐시 전용.
//! 접근 카운터 기반: `get`과 `insert` 모두 최근 사용으로 기록된다.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// A simple LRU (Least Recently Used) cache
///
/// This implementation prioritizes simplicity and low memory overhead
/// over maximum performance. Eviction scans for the oldest access stamp,
/// which is fine for the capacities the server runs with.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Storage for cached items
    entries: HashMap<K, LruEntry<V>>,
    /// Maximum number of entries (always >= 1)
    capacity: usize,
    /// Access counter for LRU tracking
    access_counter: u64,
    /// Number of evictions so far
    evictions: u64,
}

#[derive(Debug)]
struct LruEntry<V> {
    value: V,
    last_access: u64,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a new LRU cache with the given capacity
    ///
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            access_counter: 0,
            evictions: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.access_counter += 1;
        self.access_counter
    }

    /// Get a reference to a cached value
    ///
    /// Updates the access time for LRU tracking.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let stamp = self.tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_access = stamp;
                Some(&entry.value)
            }
            None => None,
        }
    }

    /// Insert a value into the cache
    ///
    /// Overwrites (and refreshes) an existing key. Otherwise, if the cache is
    /// full, the least recently used entry is evicted first.
    /// Returns the previous value for the key, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let stamp = self.tick();

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_access = stamp;
            return Some(std::mem::replace(&mut entry.value, value));
        }

        if self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        self.entries.insert(
            key,
            LruEntry {
                value,
                last_access: stamp,
            },
        );
        None
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Evict the least recently used entry
    fn evict_lru(&mut self) {
        if let Some(lru_key) = self.find_lru_key() {
            self.entries.remove(&lru_key);
            self.evictions += 1;
        }
    }

    /// Find the key with the oldest access time
    fn find_lru_key(&self) -> Option<K> {
        self.entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| k.clone())
    }

    /// Get cache statistics
    pub fn stats(&self) -> LruCacheStats {
        LruCacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            evictions: self.evictions,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruCacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub evictions: u64,
}
