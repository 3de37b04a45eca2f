//! Upstream forwarder
//!
//! 요청마다 짧은 TCP 연결 하나: connect → 라인 전송 → 응답 라인 하나 읽기.
//! 응답은 해석하지 않고 문자열 그대로 돌려준다.

use async_trait::async_trait;
use std::time::Duration;
use tiercache_foundation::{Error, Result, READ_CHUNK_SIZE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub const EMPTY_RESPONSE: &str = "Empty response from server";
pub const TRUNCATED_RESPONSE: &str = "Truncated response from server";

/// 요청 라인 하나를 upstream에 보내고 응답 라인 하나를 받는다
#[async_trait]
pub trait Forward: Send + Sync + 'static {
    /// `line`은 `\n` 없이 전달된다. 반환값도 `\n` 없이 trim된 응답.
    async fn forward(&self, line: &str) -> Result<String>;
}

/// TCP forwarder
#[derive(Debug, Clone)]
pub struct TcpForwarder {
    upstream: String,
    connect_timeout: Duration,
}

impl TcpForwarder {
    pub fn new(upstream: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            upstream: upstream.into(),
            connect_timeout,
        }
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    async fn connect(&self) -> Result<TcpStream> {
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.upstream)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(Error::upstream(format!(
                "cannot connect to {}: {}",
                self.upstream, e
            ))),
            Err(_) => Err(Error::upstream(format!(
                "connect to {} timed out after {}ms",
                self.upstream,
                self.connect_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl Forward for TcpForwarder {
    async fn forward(&self, line: &str) -> Result<String> {
        let mut stream = self.connect().await?;

        let mut payload = String::with_capacity(line.len() + 1);
        payload.push_str(line);
        payload.push('\n');
        stream
            .write_all(payload.as_bytes())
            .await
            .map_err(|e| Error::upstream(format!("write failed: {}", e)))?;

        let raw = read_reply_line(&mut stream).await?;
        let text = String::from_utf8(raw)
            .map_err(|_| Error::upstream("invalid UTF-8 in response from server"))?;

        let reply = text.trim();
        if reply.is_empty() {
            return Err(Error::upstream(EMPTY_RESPONSE));
        }
        Ok(reply.to_string())
    }
}

/// 첫 번째 `\n`까지 읽는다 (`\n` 제외). 그 뒤에 온 바이트는 버린다.
async fn read_reply_line<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| Error::upstream(format!("read failed: {}", e)))?;

        if n == 0 {
            return Err(Error::upstream(if buf.is_empty() {
                EMPTY_RESPONSE
            } else {
                TRUNCATED_RESPONSE
            }));
        }

        let start = buf.len();
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf[start..].iter().position(|&b| b == b'\n') {
            buf.truncate(start + pos);
            return Ok(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_reply_line() {
        let mut input: &[u8] = b"{\"ok\":true}\nextra";
        assert_eq!(read_reply_line(&mut input).await.unwrap(), b"{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_close_without_bytes_is_empty() {
        let mut input: &[u8] = b"";
        let err = read_reply_line(&mut input).await.unwrap_err();
        assert_eq!(err.to_string(), "Proxy error: Empty response from server");
    }

    #[tokio::test]
    async fn test_close_mid_line_is_truncated() {
        let mut input: &[u8] = b"{\"ok\":tr";
        let err = read_reply_line(&mut input).await.unwrap_err();
        assert_eq!(err.to_string(), "Proxy error: Truncated response from server");
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let forwarder = TcpForwarder::new(addr, Duration::from_secs(1));
        let err = forwarder.forward("{}").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert!(err.to_string().starts_with("Proxy error: "));
    }
}
