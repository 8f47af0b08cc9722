//! Error types for Compass
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// 플러그인 로드 단계 (configure vs register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// 설정 주입 단계
    Configure,

    /// 명령 트리 등록 단계
    Register,
}

impl std::fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configure => write!(f, "configure"),
            Self::Register => write!(f, "register"),
        }
    }
}

/// Compass 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 플러그인 등록 관련
    // ========================================================================
    #[error("cannot register a plugin without a name")]
    InvalidPlugin,

    #[error("plugin {0} already registered")]
    DuplicatePluginName(String),

    #[error("plugin alias {0} conflicts with an existing name or alias")]
    DuplicatePluginAlias(String),

    #[error("failed to {phase} plugin {plugin}: {source}")]
    PluginLoad {
        plugin: String,
        phase: LoadPhase,
        #[source]
        source: Box<Error>,
    },

    // ========================================================================
    // 컨텍스트 확장 관련
    // ========================================================================
    #[error("extension name cannot be empty")]
    InvalidExtensionName,

    #[error("failed to merge extension data for {extension}: {message}")]
    Merge { extension: String, message: String },

    #[error("Detection error: {0}")]
    Detection(String),

    // ========================================================================
    // 실행자 관련
    // ========================================================================
    #[error("executor provider name cannot be empty")]
    EmptyExecutorName,

    #[error("executor provider {0} already registered")]
    ExecutorAlreadyRegistered(String),

    #[error("command '{program}' exited with code {code}")]
    CommandFailed { program: String, code: i32 },

    #[error("Cancelled")]
    Cancelled,

    // ========================================================================
    // 명령 관련
    // ========================================================================
    #[error("command name cannot be empty")]
    InvalidCommandName,

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("invalid completion provider")]
    InvalidCompletionProvider,

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 플러그인 로드 실패 에러 생성 헬퍼
    pub fn plugin_load(plugin: impl Into<String>, phase: LoadPhase, source: Error) -> Self {
        Error::PluginLoad {
            plugin: plugin.into(),
            phase,
            source: Box::new(source),
        }
    }

    /// 확장 병합 실패 에러 생성 헬퍼
    pub fn merge(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Merge {
            extension: extension.into(),
            message: message.into(),
        }
    }

    /// 등록 충돌 에러인지 확인
    pub fn is_registration_conflict(&self) -> bool {
        matches!(
            self,
            Error::InvalidPlugin
                | Error::DuplicatePluginName(_)
                | Error::DuplicatePluginAlias(_)
                | Error::InvalidExtensionName
                | Error::EmptyExecutorName
                | Error::ExecutorAlreadyRegistered(_)
        )
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
