//! Provider implementations

pub mod gemini;

use crate::error::ProviderError;
use gemini::GeminiProvider;
use tiercache_foundation::ProviderSettings;

/// 설정으로부터 Provider 생성
///
/// API 키가 없어도 생성은 성공한다. 이 경우 `complete`가
/// `NotConfigured`를 반환한다.
pub fn from_settings(settings: &ProviderSettings) -> Result<GeminiProvider, ProviderError> {
    let api_key = settings.api_key();
    if api_key.is_none() {
        tracing::warn!(
            env = %settings.api_key_env,
            "API key is not set, gpt mode will not work"
        );
    }

    let mut provider = GeminiProvider::new(api_key, settings.model.clone(), settings.timeout)?;
    if let Some(ref base_url) = settings.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(provider)
}
