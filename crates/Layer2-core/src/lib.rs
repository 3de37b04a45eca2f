//! tiercache-core: Core Runtime for tiercache
//!
//! Layer2 - 서버/프록시/클라이언트 구현 레이어
//!
//! # 주요 모듈
//!
//! - `calc`: 제한된 산술 식 평가기
//! - `dispatch`: 요청 → calc / gpt 라우팅
//! - `net`: 라인 단위 TCP accept 루프와 연결 워커
//! - `server`: 결과 캐시를 가진 권위 서버
//! - `proxy`: 응답 캐시 + meta 합성 프록시
//! - `client`: one-shot 요청과 지속 세션
//!
//! # 사용 예시
//!
//! ```ignore
//! use tiercache_core::{net, Dispatcher, ServerService};
//!
//! let dispatcher = Dispatcher::new(Arc::new(provider));
//! let service = Arc::new(ServerService::new(128, dispatcher));
//! let listener = TcpListener::bind("127.0.0.1:5555").await?;
//! net::serve(listener, service, None, shutdown_signal()).await?;
//! ```

pub mod calc;
pub mod client;
pub mod dispatch;
pub mod net;
pub mod proxy;
pub mod server;
pub mod stats;

// Re-exports
pub use client::Session;
pub use dispatch::Dispatcher;
pub use net::{serve, LineReply, LineService};
pub use proxy::{compose, Forward, ProxyService, TcpForwarder};
pub use server::ServerService;
pub use stats::{ServiceStats, StatsSnapshot};
