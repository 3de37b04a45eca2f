//! 서버 통합 테스트 - 실제 TCP 연결로 요청/응답 검증
//!
//! `cargo test -p tiercache-core --test server_test`

mod common;

use common::{spawn_server, LineClient};
use serde_json::json;
use std::time::Duration;
use tiercache_core::client::{self, calc_payload, gpt_payload};

#[tokio::test]
async fn test_calc_over_tcp() {
    let (addr, _) = spawn_server(128).await;
    let mut conn = LineClient::connect(&addr).await;

    let reply = conn.call(r#"{"mode":"calc","data":{"expr":"1+2"}}"#).await;
    assert_eq!(reply["ok"], json!(true));
    assert_eq!(reply["result"], json!(3.0));
    assert_eq!(reply["meta"]["from_cache"], json!(false));
    assert_eq!(reply["meta"]["any_cache"], json!(false));
    assert!(reply["meta"]["took_ms"].is_u64());

    let reply = conn.call(r#"{"mode":"calc","data":{"expr":"sqrt(9)"}}"#).await;
    assert_eq!(reply["result"], json!(3.0));
}

#[tokio::test]
async fn test_idempotent_caching() {
    let (addr, service) = spawn_server(128).await;
    let mut conn = LineClient::connect(&addr).await;
    let line = r#"{"mode":"calc","data":{"expr":"2*3"},"options":{"cache":true}}"#;

    let first = conn.call(line).await;
    assert_eq!(first["meta"]["from_cache"], json!(false));

    let second = conn.call(line).await;
    assert_eq!(second["result"], first["result"]);
    assert_eq!(second["meta"]["from_cache"], json!(true));
    assert_eq!(second["meta"]["any_cache"], json!(true));
    assert!(second["meta"].get("proxy_from_cache").is_none());

    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_cache_is_shared_between_connections() {
    let (addr, _) = spawn_server(128).await;
    let line = r#"{"mode":"calc","data":{"expr":"10/2"}}"#;

    let mut a = LineClient::connect(&addr).await;
    assert_eq!(a.call(line).await["meta"]["from_cache"], json!(false));

    // 다른 연결, 다른 필드 순서
    let mut b = LineClient::connect(&addr).await;
    let reply = b.call(r#"{"data":{"expr":"10/2"},"mode":"calc"}"#).await;
    assert_eq!(reply["result"], json!(5.0));
    assert_eq!(reply["meta"]["from_cache"], json!(true));
}

#[tokio::test]
async fn test_division_by_zero_keeps_connection() {
    let (addr, _) = spawn_server(128).await;
    let mut conn = LineClient::connect(&addr).await;

    let reply = conn.call(r#"{"mode":"calc","data":{"expr":"10/0"}}"#).await;
    assert_eq!(
        reply,
        json!({"ok": false, "error": "Server error: float division by zero"})
    );

    // 같은 연결에서 계속 요청 가능
    let reply = conn.call(r#"{"mode":"calc","data":{"expr":"1+1"}}"#).await;
    assert_eq!(reply["result"], json!(2.0));
}

#[tokio::test]
async fn test_validation_errors() {
    let (addr, _) = spawn_server(128).await;
    let mut conn = LineClient::connect(&addr).await;

    let reply = conn.call(r#"{"mode":"sing","data":{}}"#).await;
    assert_eq!(reply["error"], json!("Bad request: unknown mode"));

    let reply = conn.call(r#"{"mode":"calc","data":{"expr":42}}"#).await;
    assert_eq!(reply["error"], json!("Bad request: 'expr' is required (string)"));

    let reply = conn.call(r#"{"mode":"gpt"}"#).await;
    assert_eq!(reply["error"], json!("Bad request: 'prompt' is required (string)"));
}

#[tokio::test]
async fn test_malformed_line_closes_connection() {
    let (addr, _) = spawn_server(128).await;
    let mut conn = LineClient::connect(&addr).await;

    conn.send_raw(b"this is not json\n").await;
    let reply: serde_json::Value = serde_json::from_str(&conn.next_line().await.unwrap()).unwrap();
    assert_eq!(reply["ok"], json!(false));
    assert!(reply["error"].as_str().unwrap().starts_with("Malformed: "));

    // 에러 envelope 하나 후 서버가 연결을 닫는다
    assert!(conn.next_line().await.is_none());
}

#[tokio::test]
async fn test_gpt_with_stub_provider() {
    let (addr, _) = spawn_server(128).await;

    let reply = client::request(&addr, &gpt_payload("hello", true), Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(reply["ok"], json!(true));
    assert_eq!(reply["result"], json!("stub answer to: hello"));
}

#[tokio::test]
async fn test_lru_eviction_over_tcp() {
    let (addr, _) = spawn_server(2).await;
    let mut session = client::Session::connect(&addr, Duration::from_secs(2)).await.unwrap();

    for expr in ["1+1", "2+2", "3+3"] {
        session.send(&calc_payload(expr, true)).await.unwrap();
    }

    // "1+1"은 밀려났고 "3+3"은 남아 있다
    let reply = session.send(&calc_payload("1+1", true)).await.unwrap().unwrap();
    assert_eq!(reply["meta"]["from_cache"], json!(false));
    let reply = session.send(&calc_payload("3+3", true)).await.unwrap().unwrap();
    assert_eq!(reply["meta"]["from_cache"], json!(true));
}
