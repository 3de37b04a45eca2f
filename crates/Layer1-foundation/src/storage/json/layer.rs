//! 설정 레이어별 JSON 파일 위치와 읽기
//!
//! 레이어는 `ConfigLayer::ALL` 순서대로 적용되며 뒤 레이어가 앞 레이어를 덮는다.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 글로벌/프로젝트 설정 디렉토리 이름
pub const CONFIG_DIR_NAME: &str = "tiercache";

/// 설정 파일이 놓이는 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// `<config_dir>/tiercache/`
    Global,
    /// `./.tiercache/`
    Project,
}

impl ConfigLayer {
    /// 적용 순서
    pub const ALL: [ConfigLayer; 2] = [ConfigLayer::Global, ConfigLayer::Project];

    pub fn name(self) -> &'static str {
        match self {
            ConfigLayer::Global => "global",
            ConfigLayer::Project => "project",
        }
    }

    /// 레이어 디렉토리. 플랫폼 설정 디렉토리나 cwd를 알 수 없으면 None
    pub fn dir(self) -> Option<PathBuf> {
        match self {
            ConfigLayer::Global => dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME)),
            ConfigLayer::Project => std::env::current_dir()
                .ok()
                .map(|cwd| project_dir(&cwd)),
        }
    }

    pub fn file(self, filename: &str) -> Option<PathBuf> {
        self.dir().map(|d| d.join(filename))
    }
}

/// 주어진 루트 아래의 프로젝트 설정 디렉토리
pub fn project_dir(root: &Path) -> PathBuf {
    root.join(format!(".{}", CONFIG_DIR_NAME))
}

/// JSON 파일을 읽는다. 파일이 없으면 `Ok(None)`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}
