//! # tiercache Cache System
//!
//! 두 단계 캐시:
//!
//! ```text
//! client ──▶ proxy ──────────────▶ server
//!            ReplyCache            ResultCache
//!            (raw line → raw reply, (canonical key → result,
//!             unbounded)             bounded LRU)
//! ```
//!
//! - `ResultCache`: 서버 측, 정규화 키 기반 LRU
//! - `ReplyCache`: 프록시 측, 원본 라인 기반 무제한 맵
//! - `util`: LRU 구현과 정규화 키 생성

mod reply;
mod result;
pub mod util;

pub use reply::ReplyCache;
pub use result::{ResultCache, ResultCacheStats, DEFAULT_RESULT_CACHE_CAPACITY};
pub use util::{canonical_json, canonical_object, LruCache, LruCacheStats};
