//! Project Detector - 마커 기반 프로젝트 루트 탐색과 컨텍스트 구성
//!
//! 작업 디렉토리에서 조상 방향으로 걸어 올라가며 프로젝트 마커를
//! 찾습니다. 마커 우선순위는 `.compass.yml` > `vcs/` > `.git`이고,
//! `.git`은 더 강한 마커를 찾기 위해 계속 올라간 뒤의 후보로만
//! 사용됩니다 (멀티 워크트리 레이아웃에서 체크아웃 내부의 `.git`이
//! 전체 프로젝트 루트를 가리지 않도록).

use super::{
    populate_compatibility_fields, DevelopmentMode, ExtensionRegistry, Location, ProjectContext,
};
use compass_foundation::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// 프로젝트 설정 파일 이름 (루트 마커 겸용)
pub const CONFIG_FILE: &str = ".compass.yml";

/// 멀티 워크트리 레이아웃에서 체크아웃을 담는 디렉토리 이름
pub const WORKTREE_DIR: &str = "vcs";

/// 프로젝트 컨텍스트 감지기
pub struct Detector {
    working_dir: PathBuf,
    extensions: Option<Arc<ExtensionRegistry>>,
}

impl Detector {
    /// 현재 작업 디렉토리 기준 감지기 생성
    pub fn new() -> Result<Self> {
        Ok(Self {
            working_dir: std::env::current_dir()?,
            extensions: None,
        })
    }

    /// 지정한 작업 디렉토리 기준 감지기 생성
    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            extensions: None,
        }
    }

    /// 확장 레지스트리 연결
    pub fn with_extensions(mut self, registry: Arc<ExtensionRegistry>) -> Self {
        self.extensions = Some(registry);
        self
    }

    /// 컨텍스트 감지 실행
    ///
    /// 루트 마커를 찾지 못하면 작업 디렉토리를 루트로 간주하고 모드와
    /// 위치를 Unknown으로 둡니다. 확장 감지는 best-effort이고, 마지막에
    /// 호환 브릿지(populate 방향)가 적용됩니다.
    pub async fn detect(&self) -> ProjectContext {
        let (project_root, development_mode) = match find_project_root(&self.working_dir) {
            Some(found) => found,
            None => {
                debug!(working_dir = %self.working_dir.display(), "no project marker found");
                (self.working_dir.clone(), DevelopmentMode::Unknown)
            }
        };

        let mut ctx = ProjectContext::new(project_root, self.working_dir.clone());
        ctx.development_mode = development_mode;
        ctx.location = classify_location(&ctx.project_root, &ctx.working_dir, development_mode);

        if let Some(registry) = &self.extensions {
            ctx.extensions = registry.detect_all(&ctx.project_root).await;
        }

        populate_compatibility_fields(&mut ctx);
        ctx
    }
}

/// 조상 디렉토리를 걸어 올라가며 프로젝트 루트와 개발 모드 판별
fn find_project_root(start: &Path) -> Option<(PathBuf, DevelopmentMode)> {
    let mut git_root: Option<PathBuf> = None;

    for dir in start.ancestors() {
        if dir.join(CONFIG_FILE).is_file() {
            return Some((dir.to_path_buf(), classify_mode(dir)));
        }
        if dir.join(WORKTREE_DIR).is_dir() {
            return Some((dir.to_path_buf(), DevelopmentMode::MultiWorktree));
        }
        if git_root.is_none() && dir.join(".git").exists() {
            git_root = Some(dir.to_path_buf());
        }
    }

    git_root.map(|dir| (dir, DevelopmentMode::SingleRepo))
}

/// 설정 파일로 루트가 확정된 경우의 개발 모드 판별
fn classify_mode(root: &Path) -> DevelopmentMode {
    if root.join(WORKTREE_DIR).is_dir() {
        DevelopmentMode::MultiWorktree
    } else if root.join(".git").exists() {
        DevelopmentMode::SingleRepo
    } else {
        DevelopmentMode::Unknown
    }
}

/// 작업 디렉토리의 위치 분류
fn classify_location(root: &Path, working_dir: &Path, mode: DevelopmentMode) -> Location {
    if working_dir == root {
        return Location::ProjectRoot;
    }
    if mode == DevelopmentMode::MultiWorktree && working_dir.starts_with(root.join(WORKTREE_DIR)) {
        return Location::Worktree;
    }
    if working_dir.starts_with(root) {
        return Location::Subdirectory;
    }
    Location::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextExtension;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    fn make_single_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        dir
    }

    fn make_multi_worktree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "plugins: []\n").unwrap();
        let checkout = dir.path().join(WORKTREE_DIR).join("feature-x");
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::create_dir(checkout.join(".git")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_detect_single_repo_root() {
        let dir = make_single_repo();

        let ctx = Detector::with_working_dir(dir.path()).detect().await;

        assert_eq!(ctx.project_root, dir.path());
        assert_eq!(ctx.development_mode, DevelopmentMode::SingleRepo);
        assert_eq!(ctx.location, Location::ProjectRoot);
    }

    #[tokio::test]
    async fn test_detect_subdirectory() {
        let dir = make_single_repo();

        let ctx = Detector::with_working_dir(dir.path().join("src"))
            .detect()
            .await;

        assert_eq!(ctx.project_root, dir.path());
        assert_eq!(ctx.location, Location::Subdirectory);
    }

    #[tokio::test]
    async fn test_detect_inside_worktree() {
        let dir = make_multi_worktree();
        let checkout = dir.path().join(WORKTREE_DIR).join("feature-x");

        // 체크아웃 내부의 .git이 아니라 vcs/를 가진 조상이 루트가 된다
        let ctx = Detector::with_working_dir(&checkout).detect().await;

        assert_eq!(ctx.project_root, dir.path());
        assert_eq!(ctx.development_mode, DevelopmentMode::MultiWorktree);
        assert_eq!(ctx.location, Location::Worktree);
    }

    #[tokio::test]
    async fn test_detect_without_markers() {
        let dir = tempfile::tempdir().unwrap();

        let ctx = Detector::with_working_dir(dir.path()).detect().await;

        assert_eq!(ctx.project_root, dir.path());
        assert_eq!(ctx.development_mode, DevelopmentMode::Unknown);
    }

    #[tokio::test]
    async fn test_detect_runs_extensions_and_bridge() {
        struct ComposeProbe;

        #[async_trait]
        impl ContextExtension for ComposeProbe {
            fn name(&self) -> &str {
                "docker"
            }

            async fn detect(&self, project_root: &Path) -> compass_foundation::Result<Option<Value>> {
                if project_root.join("docker-compose.yml").exists() {
                    Ok(Some(json!({
                        "compose_files": ["docker-compose.yml"],
                        "docker_running": true,
                    })))
                } else {
                    Ok(None)
                }
            }
        }

        let dir = make_single_repo();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}").unwrap();

        let registry = Arc::new(ExtensionRegistry::new());
        registry.register(Arc::new(ComposeProbe)).await.unwrap();

        let ctx = Detector::with_working_dir(dir.path())
            .with_extensions(registry)
            .detect()
            .await;

        // 확장 데이터와 레거시 필드 모두 채워진다
        assert!(ctx.extension("docker").is_some());
        assert_eq!(ctx.compose_files, vec!["docker-compose.yml"]);
        assert!(ctx.docker_running);
    }
}
