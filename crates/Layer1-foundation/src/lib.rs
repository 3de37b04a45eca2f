//! # tiercache-foundation
//!
//! Foundation layer for tiercache:
//! - Error: 와이어 메시지를 겸하는 에러 타입
//! - Protocol: 라인 단위 JSON 프레이밍, 요청/응답 envelope
//! - Cache: LRU 결과 캐시 (서버), 원본 응답 캐시 (프록시), 정규화 키
//! - Config: 통합 설정 (TierConfig)
//! - Storage: 설정 레이어 (글로벌/프로젝트) JSON 읽기
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────┐  line JSON  ┌──────────────┐  line JSON  ┌──────────────┐
//! │  Client  │ ──────────▶ │    Proxy     │ ──────────▶ │    Server    │
//! │          │ ◀────────── │ ReplyCache   │ ◀────────── │ ResultCache  │
//! └──────────┘             └──────────────┘             └──────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod protocol;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Protocol
// ============================================================================
pub use protocol::{
    cache_enabled, decode_object, encode_line, Envelope, LineFramer, Meta, Request, RequestKind,
    READ_CHUNK_SIZE,
};

// ============================================================================
// Cache
// ============================================================================
pub use cache::{
    canonical_json, canonical_object, LruCache, ReplyCache, ResultCache, ResultCacheStats,
};

// ============================================================================
// Config
// ============================================================================
pub use config::{ClientSettings, ProviderSettings, ProxySettings, ServerSettings, TierConfig};

// ============================================================================
// Storage
// ============================================================================
pub use storage::ConfigLayer;
