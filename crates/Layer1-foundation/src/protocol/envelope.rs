//! Response envelope
//!
//! 성공: `{ok: true, result, meta: {from_cache, any_cache, took_ms, proxy_from_cache?}}`
//! 실패: `{ok: false, error}` (meta 없음)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// Cache provenance metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// 서버 LRU 캐시 적중
    #[serde(default)]
    pub from_cache: bool,
    /// 어느 캐시든 적중 (server OR proxy)
    #[serde(default)]
    pub any_cache: bool,
    #[serde(default)]
    pub took_ms: u64,
    /// 프록시 캐시 적중 (프록시를 거친 응답에만 존재)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_from_cache: Option<bool>,
}

impl Meta {
    /// Metadata as produced by the server (no proxy hop yet)
    pub fn server(from_cache: bool, took_ms: u64) -> Self {
        Self {
            from_cache,
            any_cache: from_cache,
            took_ms,
            proxy_from_cache: None,
        }
    }
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success(result: Value, meta: Meta) -> Self {
        Self {
            ok: true,
            result: Some(result),
            meta: Some(meta),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            meta: None,
            error: Some(message.into()),
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self::failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let env = Envelope::success(json!(3.0), Meta::server(false, 2));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(
            v,
            json!({"ok": true, "result": 3.0, "meta": {"from_cache": false, "any_cache": false, "took_ms": 2}})
        );
        assert_eq!(
            serde_json::to_string(&env).unwrap(),
            r#"{"ok":true,"result":3.0,"meta":{"from_cache":false,"any_cache":false,"took_ms":2}}"#
        );
    }

    #[test]
    fn test_failure_has_no_meta() {
        let env = Envelope::from_error(&Error::validation("unknown mode"));
        assert_eq!(
            serde_json::to_string(&env).unwrap(),
            r#"{"ok":false,"error":"Bad request: unknown mode"}"#
        );
    }

    #[test]
    fn test_proxied_meta_parses() {
        let env: Envelope = serde_json::from_str(
            r#"{"ok":true,"result":"x","meta":{"from_cache":false,"any_cache":true,"took_ms":0,"proxy_from_cache":true}}"#,
        )
        .unwrap();
        let meta = env.meta.unwrap();
        assert_eq!(meta.proxy_from_cache, Some(true));
        assert!(meta.any_cache);
    }
}
