//! Config Loading - `.compass.yml` 탐색과 파싱
//!
//! 작업 디렉토리에서 조상 방향으로 `.compass.yml`을 찾고, 없으면 홈
//! 디렉토리를 봅니다. 파일이 없는 것은 정상이고 빈 설정으로 동작합니다.

use anyhow::Context as _;
use compass_foundation::Config;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 설정 파일 이름
pub const CONFIG_FILE: &str = ".compass.yml";

/// 설정 파일 경로 탐색 (작업 디렉토리 조상 -> 홈)
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let home = dirs::home_dir()?.join(CONFIG_FILE);
    home.is_file().then_some(home)
}

/// 설정 로드
///
/// 파일이 없으면 빈 설정을 반환합니다. 파일이 있는데 파싱이 안 되면
/// 에러입니다 (망가진 설정을 조용히 무시하지 않는다).
pub fn load(working_dir: &Path) -> anyhow::Result<Config> {
    let Some(path) = find_config_file(working_dir) else {
        debug!("no config file found; using empty config");
        return Ok(Config::new());
    };

    load_file(&path)
}

/// 특정 파일에서 설정 로드
pub fn load_file(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let sections: HashMap<String, Value> = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    debug!(path = %path.display(), sections = sections.len(), "config loaded");
    Ok(Config::from_sections(sections))
}
