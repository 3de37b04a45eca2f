//! Cache utilities
//!
//! Provides caching primitives for tiercache:
//! - `LruCache`: Simple LRU cache
//! - `canonical_json`: 키 정렬 직렬화 (캐시 키)

mod key;
mod lru;

pub use key::{canonical_json, canonical_object};
pub use lru::{LruCache, LruCacheStats};
