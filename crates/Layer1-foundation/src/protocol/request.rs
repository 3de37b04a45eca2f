//! Request 타입 - `{mode, data, options}`
//!
//! 와이어에서 받은 JSON 객체를 태그된 enum으로 검증한다.
//! 캐시 키는 검증 이전의 원본 객체로 계산하므로, 이 타입은 디스패치 전용이다.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Request mode (tagged union)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// 수식 계산: `data.expr`
    Calc { expr: String },
    /// 텍스트 생성: `data.prompt`
    Gpt { prompt: String },
}

impl RequestKind {
    pub fn mode(&self) -> &'static str {
        match self {
            RequestKind::Calc { .. } => "calc",
            RequestKind::Gpt { .. } => "gpt",
        }
    }
}

/// A validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kind: RequestKind,
    pub use_cache: bool,
}

impl Request {
    pub fn calc(expr: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Calc { expr: expr.into() },
            use_cache: true,
        }
    }

    pub fn gpt(prompt: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Gpt {
                prompt: prompt.into(),
            },
            use_cache: true,
        }
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Validate a received JSON object
    ///
    /// 검사 순서: `mode` → `data` 타입 → 필수 필드
    /// - `mode`는 정확히 "calc" 또는 "gpt"
    /// - `data`가 없거나 null이면 빈 객체로 취급
    /// - 필수 문자열 필드는 비어 있으면 안 됨
    pub fn from_object(obj: &Map<String, Value>) -> Result<Self> {
        let (field, build): (&str, fn(String) -> RequestKind) =
            match obj.get("mode").and_then(Value::as_str) {
                Some("calc") => ("expr", |expr| RequestKind::Calc { expr }),
                Some("gpt") => ("prompt", |prompt| RequestKind::Gpt { prompt }),
                _ => return Err(Error::validation("unknown mode")),
            };

        let empty = Map::new();
        let data = match obj.get("data") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => return Err(Error::validation("'data' must be an object")),
        };

        Ok(Self {
            kind: build(required_string(data, field)?),
            use_cache: cache_enabled(obj),
        })
    }

    /// Convert back to the wire form
    pub fn to_value(&self) -> Value {
        let (field, text) = match &self.kind {
            RequestKind::Calc { expr } => ("expr", expr),
            RequestKind::Gpt { prompt } => ("prompt", prompt),
        };
        let mut data = Map::new();
        data.insert(field.to_string(), Value::String(text.clone()));
        serde_json::json!({
            "mode": self.kind.mode(),
            "data": data,
            "options": { "cache": self.use_cache },
        })
    }
}

fn required_string(data: &Map<String, Value>, field: &str) -> Result<String> {
    match data.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(Error::validation(format!(
            "'{}' is required (string)",
            field
        ))),
    }
}

/// `options.cache` 해석 (기본 true)
///
/// JSON 진리값 규칙: false/null/0/""/[]/{} 는 false.
/// `options`가 객체가 아니면 없는 것으로 본다.
pub fn cache_enabled(obj: &Map<String, Value>) -> bool {
    match obj.get("options") {
        Some(Value::Object(options)) => options.get("cache").map(truthy).unwrap_or(true),
        _ => true,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
