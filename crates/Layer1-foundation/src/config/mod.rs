//! Config - 통합 설정 관리
//!
//! - `tier.rs` - TierConfig (server / proxy / provider / client)

mod tier;

pub use tier::{
    ClientSection, ClientSettings, ProviderSection, ProviderSettings, ProxySection,
    ProxySettings, ServerSection, ServerSettings, TierConfig, DEFAULT_API_KEY_ENV,
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PROXY_PORT,
    DEFAULT_SERVER_PORT, TIER_CONFIG_FILE,
};
