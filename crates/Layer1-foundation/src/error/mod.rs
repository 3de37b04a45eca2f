//! Error types for tiercache
//!
//! 모든 에러를 중앙에서 관리
//!
//! Display 문자열은 그대로 와이어의 `error` 필드가 되므로 형식을 바꾸면
//! 클라이언트가 보는 메시지도 바뀐다.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// tiercache 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 프로토콜 관련
    // ========================================================================
    /// 잘못된 JSON 라인 - 연결 종료
    #[error("Malformed: {0}")]
    Protocol(String),

    /// 필수 필드 누락/타입 오류 - 연결 유지
    #[error("Bad request: {0}")]
    Validation(String),

    /// 수식 평가 실패 - 연결 유지
    #[error("Server error: {0}")]
    Evaluation(String),

    // ========================================================================
    // 프록시 관련
    // ========================================================================
    #[error("Proxy error: {0}")]
    Upstream(String),

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 이 에러 이후 연결을 끊어야 하는지 확인
    pub fn closes_connection(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Upstream 에러 생성 헬퍼
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream(message.into())
    }

    /// Validation 에러 생성 헬퍼
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
