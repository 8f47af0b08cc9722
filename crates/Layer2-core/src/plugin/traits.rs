//! Plugin traits - 핵심 플러그인 인터페이스

use super::completion::CompletionFunc;
use super::metadata::PluginMetadata;
use crate::command::CommandDefinition;
use crate::context::ContextExtension;
use crate::shell::ExecutorProvider;
use compass_foundation::{Config, Result};
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// PluginCapability - 플러그인 기능 열거
// ============================================================================

/// 플러그인이 제공할 수 있는 기능
///
/// 레지스트리는 이 목록으로 기능 제공 여부를 판별하고, 제공하지 않는
/// 기능의 accessor는 호출하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCapability {
    /// 프로젝트 컨텍스트에 확장 데이터 기여
    ContributesContext,

    /// CLI 명령 트리에 명령 기여
    ContributesCommands,

    /// 특정 명령을 가로채는 전용 실행자 기여
    ContributesExecutor,

    /// 셸 자동완성 기여
    ContributesCompletions,
}

// ============================================================================
// Plugin Trait - 모든 플러그인이 구현해야 하는 인터페이스
// ============================================================================

/// 플러그인 트레이트
///
/// 생명주기: 프로세스 시작 시 한 번 생성 -> `configure` (설정 주입, 1회)
/// -> `register` (명령 트리 부착, 1회). 등록 이후에는 변경되지 않습니다.
pub trait Plugin: Send + Sync {
    /// 고유 플러그인 이름 (불변)
    fn name(&self) -> &str;

    /// 시맨틱 버전 문자열
    fn version(&self) -> &str;

    /// 설명
    fn description(&self) -> &str;

    /// 플러그인 메타데이터 반환
    fn metadata(&self) -> PluginMetadata;

    /// 플러그인이 제공하는 기능 목록
    fn capabilities(&self) -> Vec<PluginCapability> {
        vec![]
    }

    /// 병합된 설정 트리 주입 (명령 등록 전에 1회 호출)
    fn configure(&self, _config: &Config) -> Result<()> {
        Ok(())
    }

    /// 명령 트리 부착 (1회 호출)
    ///
    /// 기본 구현은 `provide_commands`가 반환한 정의들을 clap 트리에
    /// 추가합니다. 직접 트리를 조작하려면 재정의하세요.
    fn register(&self, mut root: clap::Command) -> Result<clap::Command> {
        for def in self.provide_commands() {
            root = root.subcommand(def.to_clap());
        }
        Ok(root)
    }

    // ========================================================================
    // Capability accessors (제공하지 않으면 기본값 유지)
    // ========================================================================

    /// 컨텍스트 확장 제공 (ContributesContext)
    fn provide_context(&self) -> Option<Arc<dyn ContextExtension>> {
        None
    }

    /// 명령 정의 제공 (ContributesCommands)
    fn provide_commands(&self) -> Vec<CommandDefinition> {
        vec![]
    }

    /// 실행자 제공자 제공 (ContributesExecutor)
    fn provide_executor(&self) -> Option<Arc<dyn ExecutorProvider>> {
        None
    }

    /// 명령별 자동완성 제공 (ContributesCompletions)
    fn provide_completions(&self) -> HashMap<String, CompletionFunc> {
        HashMap::new()
    }
}
