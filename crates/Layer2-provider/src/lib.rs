//! # tiercache-provider
//!
//! Text generation provider abstraction for the gpt mode of tiercache.
//!
//! ## Features
//! - 단일 프롬프트 → 텍스트 응답 (`Provider::complete`)
//! - Google Gemini generateContent 구현
//! - 설정(`ProviderSettings`)에서 Provider 생성

pub mod error;
pub mod providers;
pub mod r#trait;

pub use error::ProviderError;
pub use r#trait::Provider;

pub use providers::gemini::GeminiProvider;
pub use providers::from_settings;
