//! Line-oriented TCP service runtime
//!
//! 서버와 프록시가 공유하는 accept 루프와 연결 워커.
//!
//! ```text
//! accept ──▶ spawn(connection)
//!              │
//!              ▼
//!   read(4096) ─▶ LineFramer ─▶ on_line ─▶ write reply
//!      ▲                                      │
//!      └──────────────────────────────────────┘
//! ```
//!
//! 한 연결 안에서는 라인 순서대로 하나씩 처리하고 (파이프라이닝 없음),
//! 연결끼리는 별도 태스크로 병렬 실행된다.

use crate::stats::ServiceStats;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tiercache_foundation::{Error, LineFramer, Result, READ_CHUNK_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

/// accept 실패 후 재시도 전 대기
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// 한 라인을 처리한 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineReply {
    /// 응답 없음 (빈 라인 등)
    Skip,
    /// 응답 전송 후 계속
    Send(String),
    /// 응답 전송 후 연결 종료
    SendAndClose(String),
}

/// 라인 단위 요청/응답 서비스
///
/// 응답 문자열은 끝의 `\n`을 포함해야 한다.
#[async_trait]
pub trait LineService: Send + Sync + 'static {
    /// 로그에 쓰일 서비스 이름
    fn name(&self) -> &'static str;

    /// 완전한 라인 하나 처리 (`\n` 제외)
    async fn on_line(&self, line: &[u8]) -> LineReply;

    fn stats(&self) -> &ServiceStats;
}

/// Accept loop
///
/// `shutdown`이 완료되면 새 연결을 받지 않고 반환한다.
/// 진행 중인 연결 태스크는 기다리지 않는다.
pub async fn serve<S, F>(
    listener: TcpListener,
    service: Arc<S>,
    max_connections: Option<usize>,
    shutdown: F,
) -> Result<()>
where
    S: LineService,
    F: Future<Output = ()>,
{
    let limiter = max_connections.map(|n| Arc::new(Semaphore::new(n)));
    let local_addr = listener.local_addr()?;
    tracing::info!(
        service = service.name(),
        addr = %local_addr,
        max_connections = ?max_connections,
        "listening"
    );

    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            _ = &mut shutdown => break,
            permit = acquire(limiter.as_ref()) => permit?,
        };

        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!(service = service.name(), "failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
        };

        let service = Arc::clone(&service);
        tokio::spawn(async move {
            let _permit = permit;
            let connection_id = short_id();
            let peer = peer.to_string();

            tracing::info!(service = service.name(), conn = %connection_id, %peer, "new connection");
            service.stats().connection_opened();

            if let Err(e) = run_connection(service.as_ref(), stream, &connection_id).await {
                service.stats().record_error();
                tracing::error!(service = service.name(), conn = %connection_id, "connection error: {}", e);
            }

            service.stats().connection_closed();
            let snap = service.stats().snapshot();
            tracing::info!(
                service = service.name(),
                conn = %connection_id,
                %peer,
                connections = snap.connections,
                active = snap.active,
                requests = snap.requests,
                cache_hits = snap.cache_hits,
                cache_misses = snap.cache_misses,
                hit_rate = %format!("{:.2}", snap.hit_rate()),
                errors = snap.errors,
                "connection closed"
            );
        });
    }

    tracing::info!(service = service.name(), "accept loop stopped");
    Ok(())
}

async fn acquire(limiter: Option<&Arc<Semaphore>>) -> Result<Option<OwnedSemaphorePermit>> {
    match limiter {
        Some(semaphore) => Arc::clone(semaphore)
            .acquire_owned()
            .await
            .map(Some)
            .map_err(|e| Error::Io(std::io::Error::other(e))),
        None => Ok(None),
    }
}

fn short_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// Connection worker
///
/// 0바이트 read → 종료. 읽은 청크에서 완성된 라인은 다음 read 전에 모두 처리한다.
/// `SendAndClose` 이후 버퍼에 남은 라인은 버린다.
pub async fn run_connection<S, T>(service: &S, mut stream: T, connection_id: &str) -> Result<()>
where
    S: LineService + ?Sized,
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut framer = LineFramer::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    'read: loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            if !framer.pending().is_empty() {
                tracing::debug!(
                    conn = %connection_id,
                    bytes = framer.pending().len(),
                    "dropping unterminated trailing data"
                );
            }
            break;
        }
        framer.push(&chunk[..n]);

        while let Some(line) = framer.next_line() {
            match service.on_line(&line).await {
                LineReply::Skip => {}
                LineReply::Send(reply) => {
                    stream.write_all(reply.as_bytes()).await?;
                }
                LineReply::SendAndClose(reply) => {
                    stream.write_all(reply.as_bytes()).await?;
                    framer.clear();
                    break 'read;
                }
            }
        }
    }

    stream.flush().await?;
    // peer가 먼저 끊었으면 shutdown 실패는 무시
    let _ = stream.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncBufReadExt, BufReader};

    /// 라인을 대문자로 돌려주고 "quit"이면 닫는 서비스
    struct Upper {
        stats: ServiceStats,
    }

    #[async_trait]
    impl LineService for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        async fn on_line(&self, line: &[u8]) -> LineReply {
            self.stats.record_request();
            let text = String::from_utf8_lossy(line).to_string();
            match text.as_str() {
                "" => LineReply::Skip,
                "quit" => LineReply::SendAndClose("BYE\n".into()),
                _ => LineReply::Send(format!("{}\n", text.to_uppercase())),
            }
        }

        fn stats(&self) -> &ServiceStats {
            &self.stats
        }
    }

    fn upper() -> Upper {
        Upper {
            stats: ServiceStats::new(),
        }
    }

    #[tokio::test]
    async fn test_lines_in_one_chunk_are_answered_in_order() {
        let service = upper();
        let (client, server) = duplex(1024);
        let worker = tokio::spawn(async move { run_connection(&service, server, "t").await });

        let (read_half, mut write_half) = tokio::io::split(client);
        write_half.write_all(b"a\n\nb\nc").await.unwrap();
        write_half.write_all(b"\n").await.unwrap();

        let mut lines = BufReader::new(read_half).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("A"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("B"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("C"));

        drop(write_half);
        assert!(lines.next_line().await.unwrap().is_none());
        worker.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let service = upper();
        let stream = tokio_test::io::Builder::new()
            .read(b"hel")
            .read(b"lo\nwor")
            .write(b"HELLO\n")
            .read(b"ld\n")
            .write(b"WORLD\n")
            .build();

        run_connection(&service, stream, "t").await.unwrap();
        assert_eq!(service.stats().snapshot().requests, 2);
    }

    #[tokio::test]
    async fn test_send_and_close_discards_buffered_lines() {
        let service = upper();
        let (client, server) = duplex(1024);
        let worker = tokio::spawn(async move {
            run_connection(&service, server, "t").await.unwrap();
            service.stats().snapshot().requests
        });

        let (read_half, mut write_half) = tokio::io::split(client);
        write_half.write_all(b"quit\nnever\n").await.unwrap();

        let mut lines = BufReader::new(read_half).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("BYE"));
        assert!(lines.next_line().await.unwrap().is_none());

        // "never"는 처리되지 않음
        assert_eq!(worker.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(serve(listener, Arc::new(upper()), Some(4), async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
