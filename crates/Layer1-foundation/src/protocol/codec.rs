//! Line codec - 줄 단위 JSON 프레이밍
//!
//! 연결마다 하나의 `LineFramer`를 두고 읽은 바이트를 쌓은 뒤
//! 완성된 줄(`\n` 종료)만 꺼낸다. 종료되지 않은 꼬리는 다음 읽기까지 보관.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Read chunk size used by connection workers
pub const READ_CHUNK_SIZE: usize = 4096;

/// Per-connection framing buffer
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly read bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Take the next complete line, without its `\n`
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
        line.pop();
        Some(line)
    }

    /// Bytes received after the last newline
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Serialize a value as one protocol line (JSON + `\n`)
pub fn encode_line<T: Serialize>(value: &T) -> Result<String> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    Ok(line)
}

/// Parse one request line into a JSON object
///
/// UTF-8 오류, JSON 오류, 객체가 아닌 값은 모두 `Error::Protocol`.
pub fn decode_object(line: &[u8]) -> Result<Map<String, Value>> {
    let text = std::str::from_utf8(line).map_err(|e| Error::Protocol(e.to_string()))?;
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(other) => Err(Error::Protocol(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(Error::Protocol(e.to_string())),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_framer_splits_lines() {
        let mut framer = LineFramer::new();
        framer.push(b"{\"a\":1}\n{\"b\"");
        assert_eq!(framer.next_line(), Some(b"{\"a\":1}".to_vec()));
        assert_eq!(framer.next_line(), None);
        assert_eq!(framer.pending(), b"{\"b\"");

        framer.push(b":2}\n\n");
        assert_eq!(framer.next_line(), Some(b"{\"b\":2}".to_vec()));
        assert_eq!(framer.next_line(), Some(Vec::new()));
        assert_eq!(framer.next_line(), None);
    }

    #[test]
    fn test_encode_line() {
        let line = encode_line(&json!({"ok": true})).unwrap();
        assert_eq!(line, "{\"ok\":true}\n");
    }

    #[test]
    fn test_decode_object() {
        let obj = decode_object(br#" {"mode":"calc"} "#).unwrap();
        assert_eq!(obj.get("mode"), Some(&json!("calc")));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let lines: [&[u8]; 5] = [b"not json", b"", b"[1,2]", b"42", &[0xff, 0xfe]];
        for line in lines {
            let err = decode_object(line).unwrap_err();
            assert!(err.closes_connection(), "{:?}", line);
            assert!(err.to_string().starts_with("Malformed: "));
        }
    }
}
