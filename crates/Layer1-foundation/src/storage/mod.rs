//! Storage module for tiercache
//!
//! - `json`: 레이어별 JSON 설정 파일 읽기
//!
//! 캐시 상태는 영속화하지 않는다 (프로세스 종료 시 폐기).

mod json;

pub use json::{project_dir, read_json, ConfigLayer, CONFIG_DIR_NAME};
