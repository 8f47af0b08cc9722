//! Plugin-Aware Executor - 제공자 라우팅을 거치는 실행 래퍼
//!
//! 모든 명령 실행의 표준 진입점입니다. 제공자가 명령을 맡겠다고 하면
//! 그 실행자로, 아니면 기본 실행자로 보냅니다. 실행 결과와 에러는
//! 어느 경로든 가공 없이 그대로 반환됩니다.

use super::{
    global_executor_registry, CommandExecutor, ExecResult, Executor, ExecutorRegistry, Options,
    ShellCommand, StdioMode,
};
use compass_foundation::{Error, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 제공자 라우팅 실행자
pub struct PluginAwareExecutor {
    standard: Executor,
    registry: Arc<ExecutorRegistry>,
}

impl PluginAwareExecutor {
    /// 전역 레지스트리를 쓰는 실행자 생성
    pub fn new(options: Options) -> Self {
        Self {
            standard: Executor::new(options),
            registry: global_executor_registry(),
        }
    }

    /// 지정한 레지스트리를 쓰는 실행자 생성
    pub fn with_registry(options: Options, registry: Arc<ExecutorRegistry>) -> Self {
        Self {
            standard: Executor::new(options),
            registry,
        }
    }

    /// 현재 레지스트리
    pub fn registry(&self) -> Arc<ExecutorRegistry> {
        Arc::clone(&self.registry)
    }

    async fn route(&self, cmd: &ShellCommand) -> Option<Arc<dyn CommandExecutor>> {
        let provider = self.registry.find_provider(cmd).await?;
        debug!(provider = provider.name(), program = %cmd.program, "routing to plugin executor");
        Some(provider.create_executor(self.standard.options().clone()))
    }

    /// 명령 실행 (제공자 우선, 기본 실행자 폴백)
    pub async fn execute(&self, cmd: &ShellCommand) -> Result<ExecResult> {
        match self.route(cmd).await {
            Some(executor) => executor.execute(cmd).await,
            None => self.standard.execute(cmd).await,
        }
    }

    /// 취소 가능 실행
    ///
    /// 제공자 실행자의 `execute_cancellable`을 우선 호출합니다. 취소를
    /// 구현하지 않은 실행자는 기본 메서드의 저하 동작으로 처리됩니다.
    pub async fn execute_cancellable(
        &self,
        cmd: &ShellCommand,
        token: CancellationToken,
    ) -> Result<ExecResult> {
        match self.route(cmd).await {
            Some(executor) => executor.execute_cancellable(cmd, token).await,
            None => self.standard.execute_cancellable(cmd, token).await,
        }
    }

    /// 터미널 상속 모드로 실행하고 성공 여부만 반환
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<()> {
        let cmd = ShellCommand::passthrough(program).with_args(args.iter().copied());
        let result = self.execute(&cmd).await?;

        if result.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                program: program.to_string(),
                code: result.exit_code,
            })
        }
    }

    /// 캡처 모드로 실행하고 stdout 반환
    pub async fn run_capture(&self, program: &str, args: &[&str]) -> Result<String> {
        let cmd = ShellCommand::new(program)
            .with_args(args.iter().copied())
            .with_stdio(StdioMode::Capture);
        let result = self.execute(&cmd).await?;

        if result.success() {
            Ok(result.stdout)
        } else {
            Err(Error::CommandFailed {
                program: program.to_string(),
                code: result.exit_code,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ExecutorProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// 실행 대신 호출 여부만 기록하는 테스트 실행자
    struct RecordingExecutor {
        called: Arc<AtomicBool>,
        fail_with: Option<Error>,
    }

    #[async_trait]
    impl CommandExecutor for RecordingExecutor {
        async fn execute(&self, _cmd: &ShellCommand) -> Result<ExecResult> {
            self.called.store(true, Ordering::SeqCst);
            match &self.fail_with {
                Some(Error::Detection(msg)) => Err(Error::Detection(msg.clone())),
                Some(_) => Err(Error::Internal("unexpected test error".into())),
                None => Ok(ExecResult {
                    stdout: "plugin output".into(),
                    ..ExecResult::default()
                }),
            }
        }
    }

    struct TestProvider {
        called: Arc<AtomicBool>,
        fail: bool,
    }

    impl ExecutorProvider for TestProvider {
        fn name(&self) -> &str {
            "test"
        }

        fn can_handle(&self, cmd: &ShellCommand) -> bool {
            cmd.program == "managed-tool"
        }

        fn create_executor(&self, _options: Options) -> Arc<dyn CommandExecutor> {
            Arc::new(RecordingExecutor {
                called: Arc::clone(&self.called),
                fail_with: self
                    .fail
                    .then(|| Error::Detection("provider exploded".into())),
            })
        }
    }

    async fn executor_with_provider(fail: bool) -> (PluginAwareExecutor, Arc<AtomicBool>) {
        let called = Arc::new(AtomicBool::new(false));
        let registry = Arc::new(ExecutorRegistry::new());
        registry
            .register(Arc::new(TestProvider {
                called: Arc::clone(&called),
                fail,
            }))
            .await
            .unwrap();

        (
            PluginAwareExecutor::with_registry(Options::default(), registry),
            called,
        )
    }

    #[tokio::test]
    async fn test_routes_to_provider_executor() {
        let (executor, called) = executor_with_provider(false).await;

        let result = executor
            .execute(&ShellCommand::new("managed-tool"))
            .await
            .unwrap();

        assert!(called.load(Ordering::SeqCst));
        assert_eq!(result.stdout, "plugin output");
    }

    #[tokio::test]
    async fn test_falls_back_to_standard_executor() {
        let (executor, called) = executor_with_provider(false).await;

        let result = executor
            .execute(&ShellCommand::new("echo").with_arg("fallback"))
            .await
            .unwrap();

        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(result.stdout.trim(), "fallback");
    }

    #[tokio::test]
    async fn test_provider_errors_pass_through_verbatim() {
        let (executor, _) = executor_with_provider(true).await;

        let err = executor
            .execute(&ShellCommand::new("managed-tool"))
            .await
            .unwrap_err();

        // 래퍼가 에러를 감싸거나 바꾸지 않는다
        assert!(matches!(err, Error::Detection(msg) if msg == "provider exploded"));
    }

    #[tokio::test]
    async fn test_run_converts_exit_code() {
        let registry = Arc::new(ExecutorRegistry::new());
        let executor = PluginAwareExecutor::with_registry(Options::default(), registry);

        let err = executor.run("sh", &["-c", "exit 7"]).await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: 7, .. }));
    }

    #[tokio::test]
    async fn test_run_capture_returns_stdout() {
        let registry = Arc::new(ExecutorRegistry::new());
        let executor = PluginAwareExecutor::with_registry(Options::default(), registry);

        let output = executor.run_capture("echo", &["captured"]).await.unwrap();
        assert_eq!(output.trim(), "captured");
    }
}
