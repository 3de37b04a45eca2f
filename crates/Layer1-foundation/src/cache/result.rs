//! Server Result Cache
//!
//! 정규화된 요청 키 → 계산 결과(result 값만, envelope/meta 제외).
//! 모든 연결이 공유하므로 단일 mutex 뒤에 LRU를 둔다.
//! 잠금은 await 지점을 넘어서 유지되지 않는다.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::util::{LruCache, LruCacheStats};

/// Default server cache capacity
pub const DEFAULT_RESULT_CACHE_CAPACITY: usize = 128;

/// Bounded, thread-safe LRU cache of computed results
///
/// # Example
///
/// ```rust,ignore
/// let cache = ResultCache::new(128);
///
/// if let Some(result) = cache.get(&key) {
///     return result;
/// }
/// let result = evaluate(&request).await?;
/// cache.set(key, result.clone());
/// ```
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<LruCache<String, Value>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` results
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a result, marking it most recently used
    pub fn get(&self, key: &str) -> Option<Value> {
        let found = self.inner.lock().get(key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Insert or overwrite a result, marking it most recently used
    pub fn set(&self, key: String, value: Value) {
        self.inner.lock().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Get cache statistics
    pub fn stats(&self) -> ResultCacheStats {
        ResultCacheStats {
            lru: self.inner.lock().stats(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_CACHE_CAPACITY)
    }
}

/// Result cache statistics
#[derive(Debug, Clone, Copy)]
pub struct ResultCacheStats {
    pub lru: LruCacheStats,
    pub hits: u64,
    pub misses: u64,
}

impl ResultCacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}
