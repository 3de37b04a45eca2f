//! Server - 권위 있는 calc/gpt 서버
//!
//! 라인마다: 파싱 → 정규화 키 → 결과 캐시 조회 → (미스) 검증 + 평가 → 저장 → 응답.
//! 파싱 실패만 연결을 끊고, 나머지 에러는 해당 요청에만 `{ok:false}`로 응답한다.

use crate::dispatch::Dispatcher;
use crate::net::{LineReply, LineService};
use crate::stats::ServiceStats;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Instant;
use tiercache_foundation::{
    cache_enabled, canonical_object, decode_object, encode_line, Envelope, Error, Meta, Request,
    ResultCache,
};

/// Server line service
pub struct ServerService {
    cache: ResultCache,
    dispatcher: Dispatcher,
    stats: ServiceStats,
}

impl ServerService {
    pub fn new(cache_size: usize, dispatcher: Dispatcher) -> Self {
        Self {
            cache: ResultCache::new(cache_size),
            dispatcher,
            stats: ServiceStats::new(),
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// 파싱된 요청 객체 하나 처리
    ///
    /// 캐시 키는 검증 전 원본 객체(`options` 포함)로 계산한다.
    pub async fn handle(&self, obj: &Map<String, Value>) -> Envelope {
        let started = Instant::now();
        let use_cache = cache_enabled(obj);
        let key = canonical_object(obj);

        if use_cache {
            if let Some(hit) = self.cache.get(&key) {
                self.stats.record_hit();
                tracing::debug!(key = %key, "cache HIT");
                return Envelope::success(hit, Meta::server(true, elapsed_ms(started)));
            }
            self.stats.record_miss();
            tracing::debug!(key = %key, "cache MISS");
        }

        let request = match Request::from_object(obj) {
            Ok(request) => request,
            Err(e) => {
                self.stats.record_error();
                tracing::debug!("rejected request: {}", e);
                return Envelope::from_error(&e);
            }
        };

        match self.dispatcher.evaluate(&request).await {
            Ok(result) => {
                let took_ms = elapsed_ms(started);
                if use_cache {
                    self.cache.set(key, result.clone());
                }
                tracing::debug!(mode = request.kind.mode(), took_ms, "evaluated");
                Envelope::success(result, Meta::server(false, took_ms))
            }
            Err(e) => {
                self.stats.record_error();
                tracing::debug!(mode = request.kind.mode(), "evaluation failed: {}", e);
                Envelope::from_error(&e)
            }
        }
    }
}

#[async_trait]
impl LineService for ServerService {
    fn name(&self) -> &'static str {
        "server"
    }

    async fn on_line(&self, line: &[u8]) -> LineReply {
        self.stats.record_request();

        match decode_object(line) {
            Ok(obj) => LineReply::Send(render(&self.handle(&obj).await)),
            Err(e) => {
                self.stats.record_error();
                tracing::warn!("malformed request, closing connection: {}", e);
                reply_error(&e)
            }
        }
    }

    fn stats(&self) -> &ServiceStats {
        &self.stats
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Envelope → 응답 라인 (`\n` 포함)
pub(crate) fn render(envelope: &Envelope) -> String {
    match encode_line(envelope) {
        Ok(line) => line,
        Err(e) => {
            tracing::error!("failed to encode reply: {}", e);
            format!(
                "{{\"ok\":false,\"error\":{}}}\n",
                Value::String(format!("Server error: {}", e))
            )
        }
    }
}

/// 에러 응답 라인. 프로토콜 에러 뒤에는 연결을 닫는다.
pub(crate) fn reply_error(err: &Error) -> LineReply {
    let line = render(&Envelope::from_error(err));
    if err.closes_connection() {
        LineReply::SendAndClose(line)
    } else {
        LineReply::Send(line)
    }
}
