//! compass-core: Core Runtime for Compass
//!
//! Layer2 - 플러그인 오케스트레이션 레이어
//!
//! # 주요 모듈
//!
//! - `command`: 선언적 명령 모델 (`CommandDefinition`) + 디스패치 레지스트리
//! - `plugin`: Plugin 계약과 등록 시스템 (이름/별칭 충돌 검사, 원자적 등록)
//! - `context`: 프로젝트 컨텍스트 감지 (확장 레지스트리, 호환 브릿지)
//! - `shell`: 외부 명령 실행 (제공자 라우팅, 취소 가능 실행)
//!
//! # 사용 예시
//!
//! ```ignore
//! use compass_core::{global_registry, detect_with_plugins, PluginAwareExecutor, Options};
//!
//! // 플러그인 등록
//! let registry = global_registry();
//! registry.register(Arc::new(DockerPlugin::new())).await?;
//!
//! // 컨텍스트 감지
//! let ctx = detect_with_plugins(&registry.list().await).await;
//!
//! // 제공자 라우팅을 거치는 명령 실행
//! let executor = PluginAwareExecutor::new(Options::default());
//! executor.run("docker", &["ps"]).await?;
//! ```

// Core modules
pub mod command;
pub mod context;
pub mod plugin;
pub mod shell;

// Re-exports: Command
pub use command::{
    handler, CommandDefinition, CommandHandler, CommandRegistry, FlagDefinition, FlagKind,
};

// Re-exports: Plugin
pub use plugin::{
    dynamic_completion,
    static_completion,
    // Completion
    CompletionFunc,
    CompletionRegistry,
    // Metadata
    CommandInfo,
    // Traits
    Plugin,
    PluginCapability,
    PluginMetadata,
    // Registry
    global_registry,
    PluginRegistry,
};

// Re-exports: Context
pub use context::{
    detect_with_plugins,
    merge_values,
    populate_compatibility_fields,
    update_extensions_from_compatibility,
    ContainerStatus,
    // Extensions
    ContextExtension,
    // Enums
    DevelopmentMode,
    // Detection
    Detector,
    ExtensionRegistry,
    Location,
    // Context
    ProjectContext,
    DOCKER_EXTENSION,
};

// Re-exports: Shell
pub use shell::{
    global_executor_registry,
    // Traits
    CommandExecutor,
    // Model
    ExecResult,
    // Default executor
    Executor,
    ExecutorProvider,
    // Registry
    ExecutorRegistry,
    Options,
    // Routing wrapper
    PluginAwareExecutor,
    ShellCommand,
    StdioMode,
};

// Layer1 re-exports
pub use compass_foundation::{Config, Error, LoadPhase, Result};

/// Layer2 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_command_exports() {
        let def = CommandDefinition::new("status").with_short("Show status");
        assert_eq!(def.name, "status");
    }

    #[tokio::test]
    async fn test_registry_exports() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty().await);

        let executors = ExecutorRegistry::new();
        assert!(executors.is_empty().await);
    }

    #[test]
    fn test_shell_exports() {
        let cmd = ShellCommand::new("echo").with_arg("ok");
        assert_eq!(cmd.stdio, StdioMode::Capture);
        assert!(ExecResult::default().success());
    }
}
