//! Context Extensions - 플러그인이 기여하는 감지 로직
//!
//! 확장은 프로젝트 루트를 분석해 임의 구조의 데이터를 기여합니다.
//! 개별 확장의 감지 실패는 전체 감지를 중단시키지 않습니다 (부분
//! 컨텍스트가 전무한 컨텍스트보다 낫다는 정책).

use async_trait::async_trait;
use compass_foundation::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

// ============================================================================
// ContextExtension Trait
// ============================================================================

/// 컨텍스트 확장 - 이름 있는 감지 + 병합 계약
#[async_trait]
pub trait ContextExtension: Send + Sync {
    /// 고유 확장 이름 (예: "docker", "kubernetes")
    fn name(&self) -> &str;

    /// 프로젝트 루트를 분석해 확장 데이터 반환
    ///
    /// 이 프로젝트에 해당 없으면 `Ok(None)`을 반환합니다.
    async fn detect(&self, project_root: &Path) -> Result<Option<Value>>;

    /// 같은 이름의 기존 데이터와 새 데이터 병합
    ///
    /// 한쪽이 없으면 다른 쪽을 그대로 반환해야 합니다. 기본 구현은
    /// 객체의 얕은 병합(키 단위 last-write-wins)입니다.
    fn merge(&self, existing: Option<Value>, incoming: Option<Value>) -> Result<Option<Value>> {
        Ok(merge_values(existing, incoming))
    }
}

/// 기본 병합 규칙: 한쪽이 없으면 다른 쪽, 객체끼리는 키 단위로
/// 나중 값이 이기고, 그 외 타입은 나중 값으로 교체
pub fn merge_values(existing: Option<Value>, incoming: Option<Value>) -> Option<Value> {
    match (existing, incoming) {
        (None, incoming) => incoming,
        (existing, None) => existing,
        (Some(Value::Object(mut base)), Some(Value::Object(overlay))) => {
            for (key, value) in overlay {
                base.insert(key, value);
            }
            Some(Value::Object(base))
        }
        (_, incoming) => incoming,
    }
}

// ============================================================================
// ExtensionRegistry
// ============================================================================

/// 확장 레지스트리 - 이름 -> 확장
pub struct ExtensionRegistry {
    extensions: RwLock<HashMap<String, Arc<dyn ContextExtension>>>,
}

impl ExtensionRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self {
            extensions: RwLock::new(HashMap::new()),
        }
    }

    /// 확장 등록
    ///
    /// 같은 이름이 두 번 등록되면 조용히 교체됩니다 (override 플러그인을
    /// 허용하기 위한 의도된 last-write-wins).
    pub async fn register(&self, extension: Arc<dyn ContextExtension>) -> Result<()> {
        let name = extension.name().to_string();
        if name.is_empty() {
            return Err(Error::InvalidExtensionName);
        }

        let mut extensions = self.extensions.write().await;
        if extensions.insert(name.clone(), extension).is_some() {
            debug!("Extension {} overridden by later registration", name);
        }
        Ok(())
    }

    /// 확장 조회
    pub async fn get(&self, name: &str) -> Option<Arc<dyn ContextExtension>> {
        let extensions = self.extensions.read().await;
        extensions.get(name).map(Arc::clone)
    }

    /// 모든 확장 (방어적 복사)
    pub async fn all(&self) -> HashMap<String, Arc<dyn ContextExtension>> {
        let extensions = self.extensions.read().await;
        extensions.clone()
    }

    /// 등록된 확장 수
    pub async fn len(&self) -> usize {
        let extensions = self.extensions.read().await;
        extensions.len()
    }

    /// 비어있는지 확인
    pub async fn is_empty(&self) -> bool {
        let extensions = self.extensions.read().await;
        extensions.is_empty()
    }

    /// 모든 확장의 감지 실행 (best-effort)
    ///
    /// 확장 간 순서 의존성이 없으므로 병렬로 실행합니다. 실패한 확장은
    /// 결과에서 빠지고 warn 로그로만 남습니다. 해당 없음(None)은 결과에
    /// 넣지 않습니다.
    pub async fn detect_all(&self, project_root: &Path) -> HashMap<String, Value> {
        let snapshot: Vec<(String, Arc<dyn ContextExtension>)> = {
            let extensions = self.extensions.read().await;
            extensions
                .iter()
                .map(|(name, ext)| (name.clone(), Arc::clone(ext)))
                .collect()
        };

        let detections = snapshot.into_iter().map(|(name, ext)| async move {
            let result = ext.detect(project_root).await;
            (name, result)
        });

        let mut results = HashMap::new();
        for (name, result) in futures::future::join_all(detections).await {
            match result {
                Ok(Some(data)) => {
                    results.insert(name, data);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(extension = %name, error = %e, "context detection failed; skipping extension");
                }
            }
        }

        results
    }

    /// 기존 결과 집합에 새 데이터 맵 병합
    ///
    /// 양쪽에 있는 이름은 확장의 `merge`를 호출하고, 새 데이터에만 있는
    /// 이름은 그대로 가져옵니다. 병합 에러는 컨텍스트 일관성에 직결되므로
    /// 호출자에게 전파합니다.
    pub async fn merge_extension_data(
        &self,
        existing: HashMap<String, Value>,
        incoming: HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>> {
        let extensions = self.extensions.read().await;
        let mut result = existing;

        for (name, data) in incoming {
            match result.remove(&name) {
                Some(current) => {
                    let merged = match extensions.get(&name) {
                        Some(ext) => ext.merge(Some(current), Some(data))?,
                        None => merge_values(Some(current), Some(data)),
                    };
                    if let Some(value) = merged {
                        result.insert(name, value);
                    }
                }
                None => {
                    result.insert(name, data);
                }
            }
        }

        Ok(result)
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// 루트에 파일이 존재할 때만 데이터를 반환하는 테스트 확장
    struct FileProbe {
        name: String,
        file: String,
    }

    #[async_trait]
    impl ContextExtension for FileProbe {
        fn name(&self) -> &str {
            &self.name
        }

        async fn detect(&self, project_root: &Path) -> Result<Option<Value>> {
            if project_root.join(&self.file).exists() {
                Ok(Some(json!({ "compose_files": [self.file.clone()] })))
            } else {
                Ok(None)
            }
        }
    }

    struct FailingExtension;

    #[async_trait]
    impl ContextExtension for FailingExtension {
        fn name(&self) -> &str {
            "broken"
        }

        async fn detect(&self, _project_root: &Path) -> Result<Option<Value>> {
            Err(Error::Detection("probe exploded".into()))
        }
    }

    #[test]
    fn test_merge_values_identities() {
        let data = json!({ "compose_files": ["docker-compose.yml"] });

        assert_eq!(merge_values(None, Some(data.clone())), Some(data.clone()));
        assert_eq!(merge_values(Some(data.clone()), None), Some(data));
        assert_eq!(merge_values(None, None), None);
    }

    #[test]
    fn test_merge_values_last_write_wins() {
        let merged = merge_values(
            Some(json!({ "a": 1, "b": 1 })),
            Some(json!({ "b": 2, "c": 3 })),
        )
        .unwrap();

        assert_eq!(merged, json!({ "a": 1, "b": 2, "c": 3 }));
    }

    #[tokio::test]
    async fn test_register_empty_name_fails() {
        struct Nameless;

        #[async_trait]
        impl ContextExtension for Nameless {
            fn name(&self) -> &str {
                ""
            }

            async fn detect(&self, _root: &Path) -> Result<Option<Value>> {
                Ok(None)
            }
        }

        let registry = ExtensionRegistry::new();
        let err = registry.register(Arc::new(Nameless)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidExtensionName));
    }

    #[tokio::test]
    async fn test_register_last_write_wins() {
        let registry = ExtensionRegistry::new();
        registry
            .register(Arc::new(FileProbe {
                name: "docker".into(),
                file: "first.yml".into(),
            }))
            .await
            .unwrap();
        registry
            .register(Arc::new(FileProbe {
                name: "docker".into(),
                file: "second.yml".into(),
            }))
            .await
            .unwrap();

        assert_eq!(registry.len().await, 1);

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("second.yml"), "x").unwrap();

        let results = registry.detect_all(dir.path()).await;
        assert_eq!(
            results.get("docker"),
            Some(&json!({ "compose_files": ["second.yml"] }))
        );
    }

    #[tokio::test]
    async fn test_detect_all_is_best_effort() {
        let registry = ExtensionRegistry::new();
        registry
            .register(Arc::new(FileProbe {
                name: "docker".into(),
                file: "docker-compose.yml".into(),
            }))
            .await
            .unwrap();
        registry.register(Arc::new(FailingExtension)).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}").unwrap();

        let results = registry.detect_all(dir.path()).await;

        // 실패한 확장은 빠지고 성공한 확장만 남는다
        assert!(results.contains_key("docker"));
        assert!(!results.contains_key("broken"));
    }

    #[tokio::test]
    async fn test_detect_all_omits_inapplicable() {
        let registry = ExtensionRegistry::new();
        registry
            .register(Arc::new(FileProbe {
                name: "docker".into(),
                file: "docker-compose.yml".into(),
            }))
            .await
            .unwrap();

        let with_compose = tempfile::tempdir().unwrap();
        std::fs::write(with_compose.path().join("docker-compose.yml"), "x").unwrap();
        let empty = tempfile::tempdir().unwrap();

        assert!(registry
            .detect_all(with_compose.path())
            .await
            .contains_key("docker"));
        assert!(registry.detect_all(empty.path()).await.is_empty());
    }

    #[tokio::test]
    async fn test_merge_errors_propagate() {
        struct RefusingMerge;

        #[async_trait]
        impl ContextExtension for RefusingMerge {
            fn name(&self) -> &str {
                "strict"
            }

            async fn detect(&self, _root: &Path) -> Result<Option<Value>> {
                Ok(None)
            }

            fn merge(
                &self,
                _existing: Option<Value>,
                _incoming: Option<Value>,
            ) -> Result<Option<Value>> {
                Err(Error::merge("strict", "incompatible schema versions"))
            }
        }

        let registry = ExtensionRegistry::new();
        registry.register(Arc::new(RefusingMerge)).await.unwrap();

        let existing = HashMap::from([("strict".to_string(), json!({ "v": 1 }))]);
        let incoming = HashMap::from([("strict".to_string(), json!({ "v": 2 }))]);

        // 감지 실패와 달리 병합 실패는 호출자에게 올라간다
        let err = registry
            .merge_extension_data(existing, incoming)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Merge { .. }));
    }

    #[tokio::test]
    async fn test_merge_extension_data() {
        let registry = ExtensionRegistry::new();
        registry
            .register(Arc::new(FileProbe {
                name: "docker".into(),
                file: "a.yml".into(),
            }))
            .await
            .unwrap();

        let existing = HashMap::from([
            ("docker".to_string(), json!({ "a": 1, "b": 1 })),
            ("git".to_string(), json!({ "branch": "main" })),
        ]);
        let incoming = HashMap::from([
            ("docker".to_string(), json!({ "b": 2 })),
            ("terraform".to_string(), json!({ "workspace": "dev" })),
        ]);

        let merged = registry.merge_extension_data(existing, incoming).await.unwrap();

        assert_eq!(merged.get("docker"), Some(&json!({ "a": 1, "b": 2 })));
        assert_eq!(merged.get("git"), Some(&json!({ "branch": "main" })));
        assert_eq!(merged.get("terraform"), Some(&json!({ "workspace": "dev" })));
    }
}
