//! Dispatcher - 검증된 요청을 평가기로 라우팅
//!
//! 상태를 갖지 않는다. 캐시는 호출하는 쪽(서버)이 관리한다.

use crate::calc;
use serde_json::Value;
use std::sync::Arc;
use tiercache_foundation::{Request, RequestKind, Result};
use tiercache_provider::Provider;

/// 모델이 텍스트를 돌려주지 않았을 때의 결과
pub const GPT_EMPTY_RESPONSE: &str = "[GPT] Empty response (model returned no text).";

/// Provider 실패 시 결과 접두사
pub const GPT_ERROR_PREFIX: &str = "[GPT-ERROR]";

/// Request evaluator
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn Provider>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// 요청 평가
    ///
    /// - calc: 수치 결과, 실패 시 `Error::Evaluation`
    /// - gpt: 항상 성공. Provider 에러는 `[GPT-ERROR] ...` 문자열 결과가 된다
    pub async fn evaluate(&self, request: &Request) -> Result<Value> {
        match &request.kind {
            RequestKind::Calc { expr } => {
                let value = calc::evaluate(expr)?;
                Ok(Value::from(value))
            }
            RequestKind::Gpt { prompt } => Ok(Value::String(self.complete(prompt).await)),
        }
    }

    async fn complete(&self, prompt: &str) -> String {
        match self.provider.complete(prompt).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    GPT_EMPTY_RESPONSE.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                tracing::warn!(provider = self.provider.id(), error = %e, "completion failed");
                format!("{} {}", GPT_ERROR_PREFIX, e)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("provider", &self.provider.id())
            .field("model", &self.provider.model())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tiercache_foundation::Error;
    use tiercache_provider::ProviderError;

    struct FixedProvider(std::result::Result<&'static str, ProviderError>);

    #[async_trait]
    impl Provider for FixedProvider {
        fn id(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed-model"
        }

        async fn complete(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            self.0.clone().map(String::from)
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn dispatcher(reply: std::result::Result<&'static str, ProviderError>) -> Dispatcher {
        Dispatcher::new(Arc::new(FixedProvider(reply)))
    }

    #[tokio::test]
    async fn test_calc_result_is_float() {
        let d = dispatcher(Ok("unused"));
        let value = d.evaluate(&Request::calc("1+2")).await.unwrap();
        assert_eq!(value, serde_json::json!(3.0));
        assert_eq!(serde_json::to_string(&value).unwrap(), "3.0");
    }

    #[tokio::test]
    async fn test_calc_failure_is_evaluation_error() {
        let d = dispatcher(Ok("unused"));
        let err = d.evaluate(&Request::calc("10/0")).await.unwrap_err();
        assert!(matches!(err, Error::Evaluation(_)));
        assert_eq!(err.to_string(), "Server error: float division by zero");
    }

    #[tokio::test]
    async fn test_gpt_text_is_trimmed() {
        let d = dispatcher(Ok("  hello\n"));
        let value = d.evaluate(&Request::gpt("hi")).await.unwrap();
        assert_eq!(value, Value::String("hello".into()));
    }

    #[tokio::test]
    async fn test_gpt_empty_text() {
        let d = dispatcher(Ok("   "));
        let value = d.evaluate(&Request::gpt("hi")).await.unwrap();
        assert_eq!(value, Value::String(GPT_EMPTY_RESPONSE.into()));
    }

    #[tokio::test]
    async fn test_gpt_provider_error_is_successful_result() {
        let d = dispatcher(Err(ProviderError::NotConfigured("API key is not set".into())));
        let value = d.evaluate(&Request::gpt("hi")).await.unwrap();
        assert_eq!(
            value,
            Value::String("[GPT-ERROR] Provider not configured: API key is not set".into())
        );
    }
}
