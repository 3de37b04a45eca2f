//! 통합 테스트 공용 헬퍼

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tiercache_core::{net, Dispatcher, ProxyService, ServerService, TcpForwarder};
use tiercache_provider::{Provider, ProviderError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

pub const TIMEOUT: Duration = Duration::from_secs(2);

/// 네트워크 없이 프롬프트를 되돌려주는 Provider
pub struct StubProvider {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Provider for StubProvider {
    fn id(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("stub answer to: {}", prompt))
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// 서버를 임시 포트에 띄우고 주소 반환
pub async fn spawn_server(cache_size: usize) -> (String, Arc<ServerService>) {
    let provider = Arc::new(StubProvider {
        calls: AtomicUsize::new(0),
    });
    let service = Arc::new(ServerService::new(cache_size, Dispatcher::new(provider)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(net::serve(
        listener,
        Arc::clone(&service),
        None,
        std::future::pending::<()>(),
    ));
    (addr, service)
}

/// 프록시를 임시 포트에 띄우고 주소 반환
pub async fn spawn_proxy(upstream: &str) -> (String, Arc<ProxyService<TcpForwarder>>) {
    let service = Arc::new(ProxyService::new(TcpForwarder::new(upstream, TIMEOUT)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(net::serve(
        listener,
        Arc::clone(&service),
        None,
        std::future::pending::<()>(),
    ));
    (addr, service)
}

/// 연결마다 한 줄을 읽고 고정 응답을 보내는 가짜 upstream. 받은 요청 수를 센다.
pub async fn spawn_counting_upstream(reply: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&count);
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let (read_half, mut write_half) = socket.into_split();
                let mut lines = BufReader::new(read_half).lines();
                if let Ok(Some(_)) = lines.next_line().await {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let _ = write_half.write_all(reply.as_bytes()).await;
                }
            });
        }
    });

    (addr, count)
}

/// 한 연결로 여러 줄을 주고받는 테스트 클라이언트
pub struct LineClient {
    lines: tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl LineClient {
    pub async fn connect(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    pub async fn send_raw(&mut self, raw: &[u8]) {
        self.writer.write_all(raw).await.unwrap();
    }

    /// 한 줄 전송 후 응답 한 줄을 JSON으로 파싱
    pub async fn call(&mut self, line: &str) -> serde_json::Value {
        self.send_raw(format!("{}\n", line).as_bytes()).await;
        let reply = self.next_line().await.expect("connection closed before reply");
        serde_json::from_str(&reply).unwrap()
    }

    /// 다음 응답 줄. 연결이 닫혔으면 None
    pub async fn next_line(&mut self) -> Option<String> {
        tokio::time::timeout(TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for reply")
            .unwrap_or(None)
    }
}
