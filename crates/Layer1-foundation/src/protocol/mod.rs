//! Wire protocol - 줄 단위 JSON 요청/응답
//!
//! - `request`: `{mode, data, options}` 검증 → `Request`
//! - `envelope`: 성공/실패 응답과 캐시 출처 메타
//! - `codec`: 줄 프레이밍, 인코딩/디코딩

mod codec;
mod envelope;
mod request;

pub use codec::{decode_object, encode_line, LineFramer, READ_CHUNK_SIZE};
pub use envelope::{Envelope, Meta};
pub use request::{cache_enabled, Request, RequestKind};
