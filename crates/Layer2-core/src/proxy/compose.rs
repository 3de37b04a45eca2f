//! Meta compositor
//!
//! upstream 응답의 `meta`에 프록시 캐시 정보를 덧붙인다.
//! - `proxy_from_cache` = 프록시 캐시 적중 여부
//! - `any_cache` = `meta.from_cache == true` || 프록시 적중
//!
//! 나머지 필드와 필드 순서는 upstream 응답 그대로 유지한다.

use serde_json::{Map, Value};

/// 응답 라인(`\n` 제외)에 프록시 meta를 합성
///
/// JSON이 아니거나 객체가 아닌 응답은 그대로 돌려준다.
pub fn compose(base: &str, proxy_hit: bool) -> String {
    let mut reply = match serde_json::from_str::<Value>(base) {
        Ok(Value::Object(map)) => map,
        _ => return base.to_string(),
    };

    // 기존 위치를 유지하도록 제자리에서 갱신 (없거나 객체가 아니면 빈 객체로 교체)
    if !matches!(reply.get("meta"), Some(Value::Object(_))) {
        reply.insert("meta".to_string(), Value::Object(Map::new()));
    }
    if let Some(Value::Object(meta)) = reply.get_mut("meta") {
        let server_hit = meta.get("from_cache") == Some(&Value::Bool(true));
        meta.insert("proxy_from_cache".to_string(), Value::Bool(proxy_hit));
        meta.insert("any_cache".to_string(), Value::Bool(server_hit || proxy_hit));
    }

    serde_json::to_string(&Value::Object(reply)).unwrap_or_else(|e| {
        tracing::warn!("failed to re-serialize reply, relaying unchanged: {}", e);
        base.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta_of(reply: &str) -> Value {
        serde_json::from_str::<Value>(reply).unwrap()["meta"].clone()
    }

    const SERVER_MISS: &str =
        r#"{"ok":true,"result":3.0,"meta":{"from_cache":false,"any_cache":false,"took_ms":1}}"#;
    const SERVER_HIT: &str =
        r#"{"ok":true,"result":3.0,"meta":{"from_cache":true,"any_cache":true,"took_ms":0}}"#;

    #[test]
    fn test_server_miss_proxy_miss() {
        let meta = meta_of(&compose(SERVER_MISS, false));
        assert_eq!(meta["proxy_from_cache"], json!(false));
        assert_eq!(meta["any_cache"], json!(false));
        assert_eq!(meta["from_cache"], json!(false));
    }

    #[test]
    fn test_server_hit_proxy_miss() {
        let meta = meta_of(&compose(SERVER_HIT, false));
        assert_eq!(meta["proxy_from_cache"], json!(false));
        assert_eq!(meta["any_cache"], json!(true));
    }

    #[test]
    fn test_server_miss_proxy_hit() {
        let meta = meta_of(&compose(SERVER_MISS, true));
        assert_eq!(meta["proxy_from_cache"], json!(true));
        assert_eq!(meta["any_cache"], json!(true));
        assert_eq!(meta["from_cache"], json!(false));
    }

    #[test]
    fn test_server_hit_proxy_hit() {
        let meta = meta_of(&compose(SERVER_HIT, true));
        assert_eq!(meta["proxy_from_cache"], json!(true));
        assert_eq!(meta["any_cache"], json!(true));
    }

    #[test]
    fn test_field_order_preserved() {
        assert_eq!(
            compose(SERVER_MISS, true),
            r#"{"ok":true,"result":3.0,"meta":{"from_cache":false,"any_cache":true,"took_ms":1,"proxy_from_cache":true}}"#
        );
    }

    #[test]
    fn test_meta_keeps_its_position() {
        assert_eq!(
            compose(r#"{"ok":true,"meta":{"from_cache":true},"result":1.0}"#, false),
            r#"{"ok":true,"meta":{"from_cache":true,"proxy_from_cache":false,"any_cache":true},"result":1.0}"#
        );
    }

    #[test]
    fn test_missing_or_invalid_meta() {
        assert_eq!(
            compose(r#"{"ok":false,"error":"Bad request: unknown mode"}"#, false),
            r#"{"ok":false,"error":"Bad request: unknown mode","meta":{"proxy_from_cache":false,"any_cache":false}}"#
        );

        let meta = meta_of(&compose(r#"{"ok":true,"meta":"weird"}"#, true));
        assert_eq!(meta, json!({"proxy_from_cache": true, "any_cache": true}));
    }

    #[test]
    fn test_truthy_but_not_true_from_cache() {
        let meta = meta_of(&compose(r#"{"ok":true,"meta":{"from_cache":1}}"#, false));
        assert_eq!(meta["any_cache"], json!(false));
    }

    #[test]
    fn test_non_object_relayed_unchanged() {
        assert_eq!(compose("not json", true), "not json");
        assert_eq!(compose("[1,2,3]", false), "[1,2,3]");
        assert_eq!(compose("42", false), "42");
    }
}
