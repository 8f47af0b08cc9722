//! Docker Detection - compose 파일 탐색과 데몬 상태 확인
//!
//! 감지는 파일시스템 관찰만 수행합니다. compose 파일이 하나도 없으면
//! 이 프로젝트에 해당 없음(None)으로 판정합니다.

use super::DockerSettings;
use async_trait::async_trait;
use compass_core::ContextExtension;
use compass_foundation::Result;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// 인식하는 compose 파일 이름들
pub const COMPOSE_FILE_NAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// override 파일 이름
pub const COMPOSE_OVERRIDE_FILE: &str = "docker-compose.override.yml";

/// Docker 데몬 소켓 경로
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Docker 컨텍스트 확장
///
/// 프로젝트 루트와 `vcs/` 바로 아래 한 단계에서 compose 파일을 찾고,
/// 데몬 구동 여부를 함께 보고합니다. 찾은 파일 목록은 공유 슬롯에도
/// 기록되어 compose 실행자 제공자가 `COMPOSE_FILE` 주입에 사용합니다.
pub struct DockerExtension {
    settings: Arc<RwLock<DockerSettings>>,
    detected: Arc<RwLock<Vec<String>>>,
}

impl DockerExtension {
    pub(crate) fn new(
        settings: Arc<RwLock<DockerSettings>>,
        detected: Arc<RwLock<Vec<String>>>,
    ) -> Self {
        Self { settings, detected }
    }

    /// 루트와 vcs/ 한 단계 아래에서 compose 파일 수집 (루트 상대 경로)
    fn find_compose_files(&self, project_root: &Path) -> Vec<String> {
        let mut files: Vec<String> = self.settings.read().compose_files.clone();

        for name in COMPOSE_FILE_NAMES {
            if project_root.join(name).is_file() && !files.iter().any(|f| f == name) {
                files.push(name.to_string());
            }
        }

        let vcs = project_root.join("vcs");
        if let Ok(entries) = std::fs::read_dir(&vcs) {
            let mut checkouts: Vec<_> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .collect();
            checkouts.sort_by_key(|e| e.file_name());

            for checkout in checkouts {
                for name in COMPOSE_FILE_NAMES {
                    if checkout.path().join(name).is_file() {
                        let relative =
                            format!("vcs/{}/{}", checkout.file_name().to_string_lossy(), name);
                        if !files.contains(&relative) {
                            files.push(relative);
                        }
                    }
                }
            }
        }

        files
    }
}

/// Docker 데몬 구동 여부 (소켓 존재 + 바이너리 존재)
pub fn docker_daemon_running() -> bool {
    Path::new(DOCKER_SOCKET).exists() && which::which("docker").is_ok()
}

#[async_trait]
impl ContextExtension for DockerExtension {
    fn name(&self) -> &str {
        "docker"
    }

    async fn detect(&self, project_root: &Path) -> Result<Option<Value>> {
        let compose_files = self.find_compose_files(project_root);
        *self.detected.write() = compose_files.clone();

        if compose_files.is_empty() {
            debug!(root = %project_root.display(), "no compose files; docker not applicable");
            return Ok(None);
        }

        let mut data = serde_json::Map::new();
        data.insert("compose_files".into(), json!(compose_files));
        data.insert("docker_running".into(), json!(docker_daemon_running()));

        if project_root.join(COMPOSE_OVERRIDE_FILE).is_file() {
            data.insert("compose_override".into(), json!(COMPOSE_OVERRIDE_FILE));
        }

        Ok(Some(Value::Object(data)))
    }

    /// compose_files는 합집합, 나머지 키는 나중 값 우선
    fn merge(&self, existing: Option<Value>, incoming: Option<Value>) -> Result<Option<Value>> {
        let (Some(Value::Object(mut base)), Some(Value::Object(overlay))) = (existing.clone(), incoming.clone())
        else {
            return Ok(compass_core::merge_values(existing, incoming));
        };

        for (key, value) in overlay {
            if key == "compose_files" {
                let mut merged: Vec<Value> = base
                    .get("compose_files")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                if let Some(incoming_files) = value.as_array() {
                    for file in incoming_files {
                        if !merged.contains(file) {
                            merged.push(file.clone());
                        }
                    }
                }
                base.insert(key, Value::Array(merged));
            } else {
                base.insert(key, value);
            }
        }

        Ok(Some(Value::Object(base)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extension() -> DockerExtension {
        DockerExtension::new(
            Arc::new(RwLock::new(DockerSettings::default())),
            Arc::new(RwLock::new(Vec::new())),
        )
    }

    #[tokio::test]
    async fn test_detect_returns_none_without_compose_files() {
        let dir = tempfile::tempdir().unwrap();

        let result = extension().detect(dir.path()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_detect_finds_root_compose_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}").unwrap();

        let data = extension().detect(dir.path()).await.unwrap().unwrap();

        assert_eq!(data["compose_files"], json!(["docker-compose.yml"]));
        assert!(data.get("docker_running").is_some());
        assert!(data.get("compose_override").is_none());
    }

    #[tokio::test]
    async fn test_detect_finds_worktree_compose_files() {
        let dir = tempfile::tempdir().unwrap();
        let checkout = dir.path().join("vcs").join("feature-x");
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::write(checkout.join("compose.yaml"), "services: {}").unwrap();

        let data = extension().detect(dir.path()).await.unwrap().unwrap();

        assert_eq!(
            data["compose_files"],
            json!(["vcs/feature-x/compose.yaml"])
        );
    }

    #[tokio::test]
    async fn test_detect_reports_override_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}").unwrap();
        std::fs::write(dir.path().join(COMPOSE_OVERRIDE_FILE), "services: {}").unwrap();

        let data = extension().detect(dir.path()).await.unwrap().unwrap();

        assert_eq!(data["compose_override"], json!(COMPOSE_OVERRIDE_FILE));
    }

    #[tokio::test]
    async fn test_configured_files_come_first() {
        let settings = Arc::new(RwLock::new(DockerSettings {
            compose_files: vec!["custom.yml".into()],
            ..DockerSettings::default()
        }));
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}").unwrap();

        let data = DockerExtension::new(settings, Arc::new(RwLock::new(Vec::new())))
            .detect(dir.path())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            data["compose_files"],
            json!(["custom.yml", "docker-compose.yml"])
        );
    }

    #[tokio::test]
    async fn test_detect_records_files_in_shared_slot() {
        let detected = Arc::new(RwLock::new(Vec::new()));
        let ext = DockerExtension::new(
            Arc::new(RwLock::new(DockerSettings::default())),
            Arc::clone(&detected),
        );

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}").unwrap();
        ext.detect(dir.path()).await.unwrap();
        assert_eq!(*detected.read(), vec!["docker-compose.yml".to_string()]);

        // 다음 패스에서 파일이 사라지면 기록도 비워진다
        let empty = tempfile::tempdir().unwrap();
        ext.detect(empty.path()).await.unwrap();
        assert!(detected.read().is_empty());
    }

    #[test]
    fn test_merge_unions_compose_files() {
        let merged = extension()
            .merge(
                Some(json!({ "compose_files": ["a.yml"], "docker_running": false })),
                Some(json!({ "compose_files": ["a.yml", "b.yml"], "docker_running": true })),
            )
            .unwrap()
            .unwrap();

        assert_eq!(merged["compose_files"], json!(["a.yml", "b.yml"]));
        assert_eq!(merged["docker_running"], json!(true));
    }

    #[test]
    fn test_merge_identities() {
        let data = json!({ "docker_running": true });

        let ext = extension();
        assert_eq!(ext.merge(None, Some(data.clone())).unwrap(), Some(data.clone()));
        assert_eq!(ext.merge(Some(data.clone()), None).unwrap(), Some(data));
        assert_eq!(ext.merge(None, None).unwrap(), None);
    }
}
