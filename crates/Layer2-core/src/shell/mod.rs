//! Shell Execution - 외부 명령 호출 모델과 기본 실행자
//!
//! `ShellCommand`가 무엇을 어떻게 실행할지 기술하고, `Executor`가
//! tokio process로 실제 실행합니다. 0이 아닌 종료 코드는 에러가 아니라
//! `ExecResult`에 담겨 돌아오고, 편의 메서드(run/run_capture)에서만
//! `Error::CommandFailed`로 변환됩니다.

mod plugin_aware;
mod registry;

pub use plugin_aware::PluginAwareExecutor;
pub use registry::{
    global_executor_registry, CommandExecutor, ExecutorProvider, ExecutorRegistry,
};

use compass_foundation::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio_util::sync::CancellationToken;
use tracing::debug;

// ============================================================================
// Command Model
// ============================================================================

/// 표준 입출력 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// stdout/stderr 캡처 (프로그램적 소비)
    #[default]
    Capture,

    /// 부모 터미널 상속 (대화형 명령)
    Passthrough,
}

/// 실행할 외부 명령 기술
#[derive(Debug, Clone)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub stdio: StdioMode,
}

impl ShellCommand {
    /// 캡처 모드 명령 생성
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            cwd: None,
            env: HashMap::new(),
            stdio: StdioMode::Capture,
        }
    }

    /// 터미널 상속 모드 명령 생성
    pub fn passthrough(program: impl Into<String>) -> Self {
        Self {
            stdio: StdioMode::Passthrough,
            ..Self::new(program)
        }
    }

    /// 사용자 입력 한 줄을 프로그램 + 인자로 분해
    pub fn parse(line: &str) -> Result<Self> {
        let words = shlex::split(line)
            .ok_or_else(|| Error::InvalidInput(format!("unbalanced quoting in command: {line}")))?;
        let mut iter = words.into_iter();
        let program = iter
            .next()
            .ok_or_else(|| Error::InvalidInput("empty command line".into()))?;

        Ok(Self::new(program).with_args(iter))
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }
}

/// 명령 실행 결과
///
/// 0이 아닌 종료 코드도 정상 결과로 취급합니다. 실행 자체의 실패
/// (스폰 불가 등)만 에러입니다.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecResult {
    /// 종료 코드 0 여부
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// 실행자 공통 옵션
#[derive(Debug, Clone)]
pub struct Options {
    /// 명령이 cwd를 지정하지 않을 때 쓰는 기본 작업 디렉토리
    pub cwd: Option<PathBuf>,

    /// 모든 명령에 주입되는 환경 변수
    pub env: HashMap<String, String>,

    /// 부모 프로세스 환경 상속 여부
    pub inherit_env: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cwd: None,
            env: HashMap::new(),
            inherit_env: true,
        }
    }
}

// ============================================================================
// Default Executor
// ============================================================================

/// 기본 실행자 - tokio process 기반
#[derive(Debug, Clone, Default)]
pub struct Executor {
    options: Options,
}

impl Executor {
    /// 옵션으로 실행자 생성
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// 현재 옵션 참조
    pub fn options(&self) -> &Options {
        &self.options
    }

    fn build(&self, cmd: &ShellCommand) -> tokio::process::Command {
        let mut proc = tokio::process::Command::new(&cmd.program);
        proc.args(&cmd.args);

        if !self.options.inherit_env {
            proc.env_clear();
        }
        proc.envs(&self.options.env);
        proc.envs(&cmd.env);

        if let Some(cwd) = cmd.cwd.as_ref().or(self.options.cwd.as_ref()) {
            proc.current_dir(cwd);
        }

        match cmd.stdio {
            StdioMode::Capture => {
                proc.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            StdioMode::Passthrough => {
                proc.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }
        proc.stdin(Stdio::inherit());
        proc.kill_on_drop(true);
        proc
    }

    async fn run_child(&self, cmd: &ShellCommand) -> Result<ExecResult> {
        debug!(program = %cmd.program, args = ?cmd.args, "executing command");
        let output = self.build(cmd).output().await?;

        Ok(ExecResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

#[async_trait::async_trait]
impl CommandExecutor for Executor {
    async fn execute(&self, cmd: &ShellCommand) -> Result<ExecResult> {
        self.run_child(cmd).await
    }

    async fn execute_cancellable(
        &self,
        cmd: &ShellCommand,
        token: CancellationToken,
    ) -> Result<ExecResult> {
        tokio::select! {
            result = self.run_child(cmd) => result,
            _ = token.cancelled() => {
                debug!(program = %cmd.program, "command cancelled");
                Err(Error::Cancelled)
            }
        }
    }
}
