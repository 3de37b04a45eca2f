//! Tier Config - 통합 설정
//!
//! 파일 레이어(`TierConfig`, 모든 필드 Optional)와
//! 해석된 설정(`ServerSettings` 등, 기본값 적용)을 분리한다.
//! 우선순위: 기본값 < 글로벌 < 프로젝트 < CLI 플래그

use crate::cache::DEFAULT_RESULT_CACHE_CAPACITY;
use crate::storage::{read_json, ConfigLayer};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 설정 파일명
pub const TIER_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 5555;
pub const DEFAULT_PROXY_PORT: u16 = 5554;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Tier Config (파일 레이어)
// ============================================================================

/// tiercache 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub proxy: ProxySection,

    #[serde(default)]
    pub provider: ProviderSection,

    #[serde(default)]
    pub client: ClientSection,
}

impl TierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        for layer in ConfigLayer::ALL {
            let Some(path) = layer.file(TIER_CONFIG_FILE) else {
                continue;
            };
            if let Some(layer_config) = Self::load_from(&path)? {
                tracing::debug!(layer = layer.name(), path = %path.display(), "config loaded");
                config.merge(layer_config);
            }
        }

        Ok(config)
    }

    /// 단일 설정 파일 로드 (없으면 None)
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        read_json(path)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: TierConfig) {
        self.server.merge(other.server);
        self.proxy.merge(other.proxy);
        self.provider.merge(other.provider);
        self.client.merge(other.client);
    }

    // ========================================================================
    // Resolve
    // ========================================================================

    pub fn server_settings(&self) -> Result<ServerSettings> {
        let settings = ServerSettings {
            host: self.server.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.server.port.unwrap_or(DEFAULT_SERVER_PORT),
            cache_size: self.server.cache_size.unwrap_or(DEFAULT_RESULT_CACHE_CAPACITY),
            max_connections: self.server.max_connections,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn proxy_settings(&self) -> Result<ProxySettings> {
        let settings = ProxySettings {
            listen_host: self
                .proxy
                .listen_host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            listen_port: self.proxy.listen_port.unwrap_or(DEFAULT_PROXY_PORT),
            server_host: self
                .proxy
                .server_host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port: self.proxy.server_port.unwrap_or(DEFAULT_SERVER_PORT),
            connect_timeout: Duration::from_millis(
                self.proxy
                    .connect_timeout_ms
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),
            max_connections: self.proxy.max_connections,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            model: self
                .provider
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key_env: self
                .provider
                .api_key_env
                .clone()
                .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            base_url: self.provider.base_url.clone(),
            timeout: Duration::from_secs(
                self.provider
                    .timeout_secs
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
            ),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            host: self.client.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port: self.client.server_port.unwrap_or(DEFAULT_SERVER_PORT),
            proxy_port: self.client.proxy_port.unwrap_or(DEFAULT_PROXY_PORT),
            connect_timeout: Duration::from_millis(
                self.client
                    .connect_timeout_ms
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// 서버 설정 (파일 레이어)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// LRU 용량
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_size: Option<usize>,
    /// 동시 연결 상한 (없으면 무제한)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
}

impl ServerSection {
    pub fn merge(&mut self, other: ServerSection) {
        merge_opt(&mut self.host, other.host);
        merge_opt(&mut self.port, other.port);
        merge_opt(&mut self.cache_size, other.cache_size);
        merge_opt(&mut self.max_connections, other.max_connections);
    }
}

/// 프록시 설정 (파일 레이어)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
}

impl ProxySection {
    pub fn merge(&mut self, other: ProxySection) {
        merge_opt(&mut self.listen_host, other.listen_host);
        merge_opt(&mut self.listen_port, other.listen_port);
        merge_opt(&mut self.server_host, other.server_host);
        merge_opt(&mut self.server_port, other.server_port);
        merge_opt(&mut self.connect_timeout_ms, other.connect_timeout_ms);
        merge_opt(&mut self.max_connections, other.max_connections);
    }
}

/// 텍스트 생성 Provider 설정 (파일 레이어)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API 키를 읽을 환경 변수 이름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ProviderSection {
    pub fn merge(&mut self, other: ProviderSection) {
        merge_opt(&mut self.model, other.model);
        merge_opt(&mut self.api_key_env, other.api_key_env);
        merge_opt(&mut self.base_url, other.base_url);
        merge_opt(&mut self.timeout_secs, other.timeout_secs);
    }
}

/// 클라이언트 설정 (파일 레이어)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
}

impl ClientSection {
    pub fn merge(&mut self, other: ClientSection) {
        merge_opt(&mut self.host, other.host);
        merge_opt(&mut self.server_port, other.server_port);
        merge_opt(&mut self.proxy_port, other.proxy_port);
        merge_opt(&mut self.connect_timeout_ms, other.connect_timeout_ms);
    }
}

fn merge_opt<T>(target: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *target = other;
    }
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// 서버 실행 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cache_size: usize,
    pub max_connections: Option<usize>,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_size == 0 {
            return Err(Error::Config("server.cacheSize must be at least 1".to_string()));
        }
        if self.max_connections == Some(0) {
            return Err(Error::Config(
                "server.maxConnections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            cache_size: DEFAULT_RESULT_CACHE_CAPACITY,
            max_connections: None,
        }
    }
}

/// 프록시 실행 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub listen_host: String,
    pub listen_port: u16,
    pub server_host: String,
    pub server_port: u16,
    pub connect_timeout: Duration,
    pub max_connections: Option<usize>,
}

impl ProxySettings {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    pub fn upstream_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(Error::Config("proxy.serverPort must not be 0".to_string()));
        }
        if self.max_connections == Some(0) {
            return Err(Error::Config(
                "proxy.maxConnections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            listen_host: DEFAULT_HOST.to_string(),
            listen_port: DEFAULT_PROXY_PORT,
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            max_connections: None,
        }
    }
}

/// Provider 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl ProviderSettings {
    /// 환경 변수에서 API 키 읽기 (비어 있으면 None)
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// 클라이언트 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub host: String,
    pub server_port: u16,
    pub proxy_port: u16,
    pub connect_timeout: Duration,
}
