//! Project Context - 감지 패스의 공유 결과
//!
//! 한 번의 감지 호출은 하나의 `ProjectContext`를 생성합니다. 감지 패스와
//! 직후의 호환 동기화 동안에만 변경되고, 이후에는 읽기 전용입니다.

mod compatibility;
mod detector;
mod extensions;

pub use compatibility::{
    populate_compatibility_fields, update_extensions_from_compatibility, DOCKER_EXTENSION,
};
pub use detector::Detector;
pub use extensions::{merge_values, ContextExtension, ExtensionRegistry};

use crate::plugin::Plugin;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

// ============================================================================
// Enums
// ============================================================================

/// 개발 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentMode {
    /// 단일 저장소 체크아웃
    SingleRepo,

    /// vcs/ 아래에 여러 체크아웃을 두는 레이아웃
    MultiWorktree,

    /// 판별 불가
    Unknown,
}

/// 작업 디렉토리의 위치 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// 프로젝트 루트
    ProjectRoot,

    /// vcs/ 아래 워크트리 내부
    Worktree,

    /// 루트 하위 디렉토리
    Subdirectory,

    /// 프로젝트 밖
    Unknown,
}

/// 컨테이너 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Running,
    Stopped,
    Restarting,
    Unknown,
}

// ============================================================================
// ProjectContext
// ============================================================================

/// 프로젝트 컨텍스트 - 한 번의 감지 패스 결과
///
/// 레거시 Docker 필드와 `extensions["docker"]` 항목은 호환 브릿지로
/// 상호 유도 가능해야 합니다 (`compatibility` 모듈 참조).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    /// 감지된 프로젝트 루트
    pub project_root: PathBuf,

    /// 감지를 시작한 작업 디렉토리
    pub working_dir: PathBuf,

    /// 개발 모드
    pub development_mode: DevelopmentMode,

    /// 작업 디렉토리 위치 분류
    pub location: Location,

    /// 확장 이름 -> 감지 데이터 (열린 구조, 스키마는 확장이 정의)
    pub extensions: HashMap<String, Value>,

    // ========================================================================
    // Legacy fields - 마이그레이션 기간 동안 유지되는 평탄 필드
    // ========================================================================
    /// compose 파일 경로 목록
    pub compose_files: Vec<String>,

    /// compose override 파일 경로
    pub compose_override: Option<String>,

    /// Docker 데몬 실행 여부
    pub docker_running: bool,

    /// 컨테이너 이름 -> 상태
    pub containers_status: HashMap<String, ContainerStatus>,

    /// 감지 중 발생한 에러 (부분 컨텍스트라도 반환하기 위한 기록 슬롯)
    pub error: Option<String>,
}

impl ProjectContext {
    /// 새 컨텍스트 생성
    pub fn new(project_root: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            working_dir: working_dir.into(),
            development_mode: DevelopmentMode::Unknown,
            location: Location::Unknown,
            extensions: HashMap::new(),
            compose_files: vec![],
            compose_override: None,
            docker_running: false,
            containers_status: HashMap::new(),
            error: None,
        }
    }

    /// 확장 데이터 조회
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }
}

// ============================================================================
// Plugin wiring
// ============================================================================

/// 플러그인들의 컨텍스트 확장을 모아 감지 수행
///
/// CLI가 호출 시점마다 사용 가능한 플러그인 목록을 넘기면, 각 플러그인의
/// `provide_context`가 ExtensionRegistry에 연결된 뒤 감지가 실행됩니다.
/// 기능을 선언하지 않은 플러그인의 accessor는 호출하지 않습니다.
pub async fn detect_with_plugins(plugins: &[Arc<dyn Plugin>]) -> ProjectContext {
    let registry = Arc::new(ExtensionRegistry::new());

    for plugin in plugins {
        if !plugin
            .capabilities()
            .contains(&crate::plugin::PluginCapability::ContributesContext)
        {
            continue;
        }
        if let Some(extension) = plugin.provide_context() {
            if let Err(e) = registry.register(extension).await {
                warn!(plugin = plugin.name(), error = %e, "skipping invalid context extension");
            }
        }
    }

    match Detector::new() {
        Ok(detector) => detector.with_extensions(registry).detect().await,
        Err(e) => {
            // 작업 디렉토리를 알 수 없어도 에러를 담은 컨텍스트를 돌려준다
            let mut ctx = ProjectContext::new(PathBuf::new(), PathBuf::new());
            ctx.error = Some(e.to_string());
            ctx
        }
    }
}
