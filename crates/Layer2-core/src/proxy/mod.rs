//! Proxy - 투명 캐싱 프록시
//!
//! 클라이언트 라인(trim된 원문)을 키로 upstream 응답 원문을 저장한다.
//! 적중하면 upstream에 연결하지 않고 저장된 응답에 meta만 다시 합성한다.
//!
//! - `forwarder`: upstream 요청 한 번 (`Forward` trait, `TcpForwarder`)
//! - `compose`: `proxy_from_cache` / `any_cache` 합성

mod compose;
mod forwarder;

pub use compose::compose;
pub use forwarder::{Forward, TcpForwarder, EMPTY_RESPONSE, TRUNCATED_RESPONSE};

use crate::net::{LineReply, LineService};
use crate::server::reply_error;
use crate::stats::ServiceStats;
use async_trait::async_trait;
use tiercache_foundation::{Error, ReplyCache, Result};

/// Proxy line service
pub struct ProxyService<F: Forward> {
    cache: ReplyCache,
    forwarder: F,
    stats: ServiceStats,
}

impl<F: Forward> ProxyService<F> {
    pub fn new(forwarder: F) -> Self {
        Self {
            cache: ReplyCache::new(),
            forwarder,
            stats: ServiceStats::new(),
        }
    }

    pub fn cache(&self) -> &ReplyCache {
        &self.cache
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    /// 요청 라인 하나 처리 → 클라이언트에 보낼 응답 (`\n` 제외)
    ///
    /// upstream 실패는 이 요청에만 적용된다. 실패한 응답은 저장하지 않는다.
    pub async fn handle(&self, request: &str) -> Result<String> {
        if let Some(base) = self.cache.get(request) {
            self.stats.record_hit();
            tracing::debug!("proxy cache HIT");
            return Ok(compose(&base, true));
        }

        self.stats.record_miss();
        tracing::debug!("proxy cache MISS, contacting server");

        let base = self.forwarder.forward(request).await?;
        self.cache.insert(request, base.as_str());
        Ok(compose(&base, false))
    }
}

#[async_trait]
impl<F: Forward> LineService for ProxyService<F> {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn on_line(&self, line: &[u8]) -> LineReply {
        let request = match std::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("invalid UTF-8 from client, closing connection: {}", e);
                return reply_error(&Error::Protocol(format!("invalid UTF-8 in request: {}", e)));
            }
        };

        if request.is_empty() {
            return LineReply::Skip;
        }

        self.stats.record_request();

        match self.handle(request).await {
            Ok(mut reply) => {
                reply.push('\n');
                LineReply::Send(reply)
            }
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("upstream request failed: {}", e);
                reply_error(&e)
            }
        }
    }

    fn stats(&self) -> &ServiceStats {
        &self.stats
    }
}
