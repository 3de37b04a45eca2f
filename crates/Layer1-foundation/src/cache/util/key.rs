//! Canonical cache keys
//!
//! 요청 JSON을 모든 중첩 레벨에서 키 정렬된 문자열로 직렬화한다.
//! serde_json의 맵 구현(`preserve_order` 여부)과 무관하게 같은 결과가 나온다.

use serde_json::{Map, Value};

/// Serialize a JSON value with object keys sorted at every level
///
/// Two values that are structurally equal but were built with different
/// field insertion orders produce the same string.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

/// Same as [`canonical_json`] for an already-unwrapped JSON object
pub fn canonical_object(obj: &Map<String, Value>) -> String {
    let mut out = String::new();
    write_object(obj, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(obj) => write_object(obj, out),
        scalar => write_scalar(scalar, out),
    }
}

fn write_object(obj: &Map<String, Value>, out: &mut String) {
    out.push('{');
    let mut entries: Vec<(&String, &Value)> = obj.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_scalar(&Value::String(key.clone()), out);
        out.push(':');
        write_canonical(value, out);
    }
    out.push('}');
}

fn write_scalar(value: &Value, out: &mut String) {
    // Display for Value never fails for scalars
    out.push_str(&value.to_string());
}
