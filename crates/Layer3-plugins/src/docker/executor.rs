//! Compose Executor - compose 호출을 가로채는 전용 실행자
//!
//! `docker-compose …`와 `docker compose …` 두 표기를 모두 맡아,
//! 감지/설정된 compose 파일 목록을 `COMPOSE_FILE` 환경 변수로 주입한 뒤
//! 기본 실행자에 위임합니다.

use super::DockerSettings;
use async_trait::async_trait;
use compass_core::{
    CommandExecutor, ExecResult, Executor, ExecutorProvider, Options, ShellCommand,
};
use compass_foundation::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// compose 명령 제공자
///
/// 설정 파일의 compose 목록과 감지 패스가 기록한 목록을 합쳐
/// 실행자에 전달합니다 (설정이 감지보다 우선).
pub struct ComposeExecutorProvider {
    settings: Arc<RwLock<DockerSettings>>,
    detected: Arc<RwLock<Vec<String>>>,
}

impl ComposeExecutorProvider {
    pub(crate) fn new(
        settings: Arc<RwLock<DockerSettings>>,
        detected: Arc<RwLock<Vec<String>>>,
    ) -> Self {
        Self { settings, detected }
    }
}

impl ExecutorProvider for ComposeExecutorProvider {
    fn name(&self) -> &str {
        "docker-compose"
    }

    fn can_handle(&self, cmd: &ShellCommand) -> bool {
        cmd.program == "docker-compose"
            || (cmd.program == "docker" && cmd.args.first().map(String::as_str) == Some("compose"))
    }

    fn create_executor(&self, options: Options) -> Arc<dyn CommandExecutor> {
        let settings = self.settings.read();
        let mut compose_files = settings.compose_files.clone();
        for file in self.detected.read().iter() {
            if !compose_files.contains(file) {
                compose_files.push(file.clone());
            }
        }

        Arc::new(ComposeExecutor {
            inner: Executor::new(options),
            compose_files,
            compose_path: settings.compose_path.clone(),
        })
    }
}

/// compose 전용 실행자
struct ComposeExecutor {
    inner: Executor,
    compose_files: Vec<String>,
    compose_path: Option<String>,
}

impl ComposeExecutor {
    fn prepare(&self, cmd: &ShellCommand) -> ShellCommand {
        let mut cmd = cmd.clone();

        if let Some(path) = &self.compose_path {
            if cmd.program == "docker-compose" {
                cmd.program = path.clone();
            }
        }

        // 호출자가 직접 지정한 COMPOSE_FILE은 존중한다
        if !self.compose_files.is_empty() && !cmd.env.contains_key("COMPOSE_FILE") {
            let value = self.compose_files.join(":");
            debug!(compose_file = %value, "injecting COMPOSE_FILE");
            cmd.env.insert("COMPOSE_FILE".into(), value);
        }

        cmd
    }
}

#[async_trait]
impl CommandExecutor for ComposeExecutor {
    async fn execute(&self, cmd: &ShellCommand) -> Result<ExecResult> {
        self.inner.execute(&self.prepare(cmd)).await
    }

    async fn execute_cancellable(
        &self,
        cmd: &ShellCommand,
        token: CancellationToken,
    ) -> Result<ExecResult> {
        self.inner
            .execute_cancellable(&self.prepare(cmd), token)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_with(settings: DockerSettings) -> ComposeExecutorProvider {
        ComposeExecutorProvider::new(
            Arc::new(RwLock::new(settings)),
            Arc::new(RwLock::new(Vec::new())),
        )
    }

    #[test]
    fn test_can_handle_both_spellings() {
        let provider = provider_with(DockerSettings::default());

        assert!(provider.can_handle(&ShellCommand::new("docker-compose").with_arg("up")));
        assert!(provider.can_handle(&ShellCommand::new("docker").with_args(["compose", "up"])));
        assert!(!provider.can_handle(&ShellCommand::new("docker").with_arg("ps")));
        assert!(!provider.can_handle(&ShellCommand::new("npm")));
    }

    #[tokio::test]
    async fn test_create_executor_merges_detected_files() {
        let settings = Arc::new(RwLock::new(DockerSettings {
            compose_files: vec!["base.yml".into()],
            ..DockerSettings::default()
        }));
        let detected = Arc::new(RwLock::new(vec![
            "base.yml".to_string(),
            "docker-compose.yml".to_string(),
        ]));
        let provider = ComposeExecutorProvider::new(settings, detected);

        let executor = provider.create_executor(Options::default());
        let result = executor
            .execute(&ShellCommand::new("sh").with_args(["-c", "echo \"$COMPOSE_FILE\""]))
            .await
            .unwrap();

        assert_eq!(result.stdout.trim(), "base.yml:docker-compose.yml");
    }

    #[test]
    fn test_prepare_injects_compose_file_env() {
        let settings = Arc::new(RwLock::new(DockerSettings {
            compose_files: vec!["a.yml".into(), "b.yml".into()],
            ..DockerSettings::default()
        }));
        let executor = ComposeExecutor {
            inner: Executor::default(),
            compose_files: settings.read().compose_files.clone(),
            compose_path: None,
        };

        let prepared = executor.prepare(&ShellCommand::new("docker-compose").with_arg("up"));

        assert_eq!(prepared.env.get("COMPOSE_FILE").map(String::as_str), Some("a.yml:b.yml"));
    }

    #[test]
    fn test_prepare_keeps_caller_compose_file() {
        let executor = ComposeExecutor {
            inner: Executor::default(),
            compose_files: vec!["detected.yml".into()],
            compose_path: None,
        };

        let cmd = ShellCommand::new("docker-compose").with_env("COMPOSE_FILE", "explicit.yml");
        let prepared = executor.prepare(&cmd);

        assert_eq!(
            prepared.env.get("COMPOSE_FILE").map(String::as_str),
            Some("explicit.yml")
        );
    }

    #[test]
    fn test_prepare_rewrites_compose_path() {
        let executor = ComposeExecutor {
            inner: Executor::default(),
            compose_files: vec![],
            compose_path: Some("/usr/local/bin/docker-compose".into()),
        };

        let prepared = executor.prepare(&ShellCommand::new("docker-compose").with_arg("ps"));
        assert_eq!(prepared.program, "/usr/local/bin/docker-compose");

        // docker compose 표기는 바꾸지 않는다
        let prepared = executor.prepare(&ShellCommand::new("docker").with_args(["compose", "ps"]));
        assert_eq!(prepared.program, "docker");
    }
}
