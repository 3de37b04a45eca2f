//! Proxy Reply Cache
//!
//! 원본 요청 라인 → 서버가 돌려준 원본 응답 라인.
//! 메타 합성 이전의 응답만 저장한다. 축출/갱신/만료 없음 (무제한 증가).

use parking_lot::Mutex;
use std::collections::HashMap;

/// Unbounded, thread-safe map from raw request line to raw reply line
#[derive(Debug, Default)]
pub struct ReplyCache {
    entries: Mutex<HashMap<String, String>>,
}

impl ReplyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the stored reply verbatim
    pub fn get(&self, request_line: &str) -> Option<String> {
        self.entries.lock().get(request_line).cloned()
    }

    /// Store the upstream reply for a request line
    pub fn insert(&self, request_line: impl Into<String>, reply_line: impl Into<String>) {
        self.entries
            .lock()
            .insert(request_line.into(), reply_line.into());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
