//! Docker Plugin - compose 감지, docker 명령 트리, compose 실행 라우팅
//!
//! 네 가지 기능을 모두 제공하는 내장 플러그인입니다:
//! 컨텍스트 확장(compose 파일 감지), `docker` 명령 트리, compose 호출을
//! 가로채는 실행자 제공자, 셸 자동완성.

mod detector;
mod executor;

pub use detector::{docker_daemon_running, DockerExtension, COMPOSE_FILE_NAMES};
pub use executor::ComposeExecutorProvider;

use compass_core::{
    detect_with_plugins, global_registry, handler, static_completion, CommandDefinition,
    CommandInfo, CompletionFunc, ContextExtension, ExecutorProvider, Options, Plugin,
    PluginAwareExecutor, PluginCapability, PluginMetadata, ShellCommand,
};
use compass_foundation::{Config, Error, Result};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// `.compass.yml`의 `docker` 섹션
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    /// docker-compose 바이너리 경로 재정의
    pub compose_path: Option<String>,

    /// 감지보다 우선하는 명시적 compose 파일 목록
    pub compose_files: Vec<String>,
}

/// Docker 내장 플러그인
pub struct DockerPlugin {
    settings: Arc<RwLock<DockerSettings>>,
    extension: Arc<DockerExtension>,
    provider: Arc<ComposeExecutorProvider>,
}

impl DockerPlugin {
    pub fn new() -> Self {
        let settings = Arc::new(RwLock::new(DockerSettings::default()));
        // 확장이 기록한 감지 결과를 실행자 제공자가 읽는다
        let detected = Arc::new(RwLock::new(Vec::new()));
        Self {
            extension: Arc::new(DockerExtension::new(
                Arc::clone(&settings),
                Arc::clone(&detected),
            )),
            provider: Arc::new(ComposeExecutorProvider::new(
                Arc::clone(&settings),
                detected,
            )),
            settings,
        }
    }

    /// `docker` 명령 트리 구성
    fn docker_command(&self) -> CommandDefinition {
        let status = CommandDefinition::new("status")
            .with_short("Show Docker environment status")
            .with_handler(handler(|_matches| async move {
                let plugins = global_registry().list().await;
                let ctx = detect_with_plugins(&plugins).await;

                println!("Docker running: {}", ctx.docker_running);
                if ctx.compose_files.is_empty() {
                    println!("Compose files: (none detected)");
                } else {
                    println!("Compose files:");
                    for file in &ctx.compose_files {
                        println!("  {file}");
                    }
                }
                if let Some(override_file) = &ctx.compose_override {
                    println!("Compose override: {override_file}");
                }
                for (name, state) in &ctx.containers_status {
                    println!("  {name}: {state:?}");
                }
                Ok(())
            }));

        let compose = CommandDefinition::new("compose")
            .with_usage("compose [args...]")
            .with_short("Run docker compose with detected compose files")
            .with_example("compass docker compose up -d")
            .with_trailing_args()
            .with_handler(handler(|matches| async move {
                let args: Vec<String> = matches
                    .get_many::<String>("args")
                    .map(|v| v.cloned().collect())
                    .unwrap_or_default();

                let executor = PluginAwareExecutor::new(Options::default());
                let cmd = ShellCommand::passthrough("docker")
                    .with_arg("compose")
                    .with_args(args);

                let result = executor.execute(&cmd).await?;
                if result.success() {
                    Ok(())
                } else {
                    Err(Error::CommandFailed {
                        program: "docker compose".into(),
                        code: result.exit_code,
                    })
                }
            }));

        CommandDefinition::new("docker")
            .with_short("Docker environment commands")
            .with_category("Development")
            .with_alias("d")
            .with_subcommand(status)
            .with_subcommand(compose)
    }
}

impl Default for DockerPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DockerPlugin {
    fn name(&self) -> &str {
        "docker"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Docker and Docker Compose integration"
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(self.name(), self.version())
            .with_description(self.description())
            .with_author("Compass Contributors")
            .with_alias("d")
            .with_command(CommandInfo::new(
                "docker",
                "Development",
                "Docker environment commands",
            ))
    }

    fn capabilities(&self) -> Vec<PluginCapability> {
        vec![
            PluginCapability::ContributesContext,
            PluginCapability::ContributesCommands,
            PluginCapability::ContributesExecutor,
            PluginCapability::ContributesCompletions,
        ]
    }

    fn configure(&self, config: &Config) -> Result<()> {
        if let Some(section) = config.section("docker") {
            let settings: DockerSettings = serde_json::from_value(section.clone())
                .map_err(|e| Error::Config(format!("invalid docker config section: {e}")))?;
            *self.settings.write() = settings;
        }
        Ok(())
    }

    fn provide_context(&self) -> Option<Arc<dyn ContextExtension>> {
        Some(Arc::clone(&self.extension) as Arc<dyn ContextExtension>)
    }

    fn provide_commands(&self) -> Vec<CommandDefinition> {
        vec![self.docker_command()]
    }

    fn provide_executor(&self) -> Option<Arc<dyn ExecutorProvider>> {
        Some(Arc::clone(&self.provider) as Arc<dyn ExecutorProvider>)
    }

    fn provide_completions(&self) -> HashMap<String, CompletionFunc> {
        HashMap::from([(
            "docker".to_string(),
            static_completion(vec!["status".into(), "compose".into()]),
        )])
    }
}
