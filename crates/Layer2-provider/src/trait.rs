//! Provider trait

use crate::error::ProviderError;
use async_trait::async_trait;

/// 프롬프트 하나를 받아 텍스트 하나를 돌려주는 생성기
///
/// 서버의 gpt 모드는 이 trait만 알고 있으므로 테스트에서는
/// 네트워크 없이 고정 응답을 돌려주는 구현으로 대체할 수 있다.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider 식별자 (e.g., "gemini")
    fn id(&self) -> &str;

    /// 사용 중인 모델 ID
    fn model(&self) -> &str;

    /// Complete a single prompt
    ///
    /// 모델이 텍스트를 돌려주지 않으면 빈 문자열을 반환한다.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Check if provider is available (API key set, etc.)
    fn is_available(&self) -> bool;
}
