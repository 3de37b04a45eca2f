//! Client - 서버/프록시용 라인 JSON 클라이언트
//!
//! - `request`: 연결 하나로 요청 하나 (one-shot)
//! - `Session`: 지속 연결로 여러 요청을 순서대로 전송

use serde_json::{json, Value};
use std::time::Duration;
use tiercache_foundation::{encode_line, Error, LineFramer, Request, Result, READ_CHUNK_SIZE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// 응답 없이 연결이 닫혔을 때의 응답
pub fn no_response() -> Value {
    json!({"ok": false, "error": "No response"})
}

/// 연결 → 요청 하나 → 응답 하나
///
/// 응답 없이 연결이 닫히면 `{ok:false, error:"No response"}`를 반환한다.
pub async fn request(addr: &str, payload: &Value, connect_timeout: Duration) -> Result<Value> {
    let mut session = Session::connect(addr, connect_timeout).await?;
    Ok(session.send(payload).await?.unwrap_or_else(no_response))
}

/// Persistent connection
pub struct Session {
    stream: TcpStream,
    framer: LineFramer,
    addr: String,
}

impl Session {
    pub async fn connect(addr: &str, connect_timeout: Duration) -> Result<Self> {
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("connect to {} timed out", addr),
                ))
            })??;

        tracing::debug!(%addr, "connected");
        Ok(Self {
            stream,
            framer: LineFramer::new(),
            addr: addr.to_string(),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// 요청 전송 후 응답 한 줄 대기
    ///
    /// 응답 전에 연결이 닫히면 `None`.
    pub async fn send(&mut self, payload: &Value) -> Result<Option<Value>> {
        let line = encode_line(payload)?;
        self.stream.write_all(line.as_bytes()).await?;

        match self.read_line().await? {
            Some(reply) => Ok(Some(serde_json::from_slice(&reply)?)),
            None => Ok(None),
        }
    }

    async fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            if let Some(line) = self.framer.next_line() {
                return Ok(Some(line));
            }
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(None);
            }
            self.framer.push(&chunk[..n]);
        }
    }
}

/// calc 요청 payload
pub fn calc_payload(expr: &str, use_cache: bool) -> Value {
    Request::calc(expr).with_cache(use_cache).to_value()
}

/// gpt 요청 payload
pub fn gpt_payload(prompt: &str, use_cache: bool) -> Value {
    Request::gpt(prompt).with_cache(use_cache).to_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads() {
        assert_eq!(
            serde_json::to_string(&calc_payload("1+2", true)).unwrap(),
            r#"{"mode":"calc","data":{"expr":"1+2"},"options":{"cache":true}}"#
        );
        assert_eq!(gpt_payload("hi", false)["options"]["cache"], json!(false));
    }

    #[tokio::test]
    async fn test_request_without_reply() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        // 요청을 읽고 응답 없이 닫는 서버
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = socket.read(&mut buf).await;
        });

        let reply = request(&addr, &calc_payload("1", true), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, no_response());
    }
}
