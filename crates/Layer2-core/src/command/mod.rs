//! Command Model - 플러그인이 기여하는 명령 정의
//!
//! 플러그인은 `CommandDefinition`으로 명령 트리를 선언하고, 등록 시점에
//! clap 명령으로 변환됩니다. 핸들러는 정의에 남아 있다가 파싱 이후
//! `CommandRegistry::dispatch`로 실행됩니다.

use clap::{Arg, ArgAction, ArgMatches};
use compass_foundation::{Error, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Handler
// ============================================================================

/// 명령 핸들러 - 파싱된 인자를 받아 실행
///
/// clap은 핸들러를 명령에 달 수 없으므로 정의 쪽에 보관합니다.
pub type CommandHandler =
    Arc<dyn Fn(ArgMatches) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// 비동기 클로저로부터 핸들러 생성
pub fn handler<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(ArgMatches) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |matches| Box::pin(f(matches)))
}

// ============================================================================
// Flag Definition
// ============================================================================

/// 플래그 데이터 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    String,
    Bool,
    Int,
    StringList,
}

/// 명령 플래그 정의
#[derive(Debug, Clone)]
pub struct FlagDefinition {
    /// 플래그 이름 (대시 제외)
    pub name: String,

    /// 한 글자 단축형
    pub shorthand: Option<char>,

    /// 도움말 텍스트
    pub usage: String,

    /// 데이터 타입
    pub kind: FlagKind,

    /// 기본값 (문자열 표현)
    pub default: Option<String>,

    /// 필수 여부
    pub required: bool,

    /// 도움말에서 숨김 여부
    pub hidden: bool,
}

impl FlagDefinition {
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            shorthand: None,
            usage: String::new(),
            kind,
            default: None,
            required: false,
            hidden: false,
        }
    }

    pub fn with_shorthand(mut self, c: char) -> Self {
        self.shorthand = Some(c);
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// clap Arg로 변환
    fn to_clap(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.usage.clone());

        if let Some(c) = self.shorthand {
            arg = arg.short(c);
        }

        arg = match self.kind {
            FlagKind::Bool => arg.action(ArgAction::SetTrue),
            FlagKind::Int => arg
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(i64)),
            FlagKind::StringList => arg.action(ArgAction::Append),
            FlagKind::String => arg.action(ArgAction::Set),
        };

        if let Some(default) = &self.default {
            if self.kind != FlagKind::Bool {
                arg = arg.default_value(default.clone());
            }
        }

        if self.required {
            arg = arg.required(true);
        }
        if self.hidden {
            arg = arg.hide(true);
        }

        arg
    }
}

// ============================================================================
// Command Definition
// ============================================================================

/// 플러그인 명령 정의 - 호출 가능한 단위의 선언적 표현
#[derive(Clone)]
pub struct CommandDefinition {
    /// 명령 이름
    pub name: String,

    /// 사용법 문자열 (예: "compose [args...]")
    pub usage: String,

    /// 짧은 설명
    pub short: String,

    /// 상세 설명
    pub long: String,

    /// 사용 예시
    pub example: String,

    /// 대체 이름들
    pub aliases: Vec<String>,

    /// 도움말에서 숨김 여부
    pub hidden: bool,

    /// 도움말 그룹화용 카테고리
    pub category: String,

    /// 플래그 정의들
    pub flags: Vec<FlagDefinition>,

    /// 하위 명령들
    pub subcommands: Vec<CommandDefinition>,

    /// 나머지 인자를 그대로 넘겨받는지 여부 (pass-through 명령용)
    pub trailing_args: bool,

    /// 실행 핸들러
    pub handler: Option<CommandHandler>,
}

impl std::fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("short", &self.short)
            .field("aliases", &self.aliases)
            .field("category", &self.category)
            .field("flags", &self.flags)
            .field("subcommands", &self.subcommands)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl CommandDefinition {
    /// 새 명령 정의 생성
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            usage: String::new(),
            short: String::new(),
            long: String::new(),
            example: String::new(),
            aliases: vec![],
            hidden: false,
            category: String::new(),
            flags: vec![],
            subcommands: vec![],
            trailing_args: false,
            handler: None,
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_flag(mut self, flag: FlagDefinition) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_subcommand(mut self, sub: CommandDefinition) -> Self {
        self.subcommands.push(sub);
        self
    }

    pub fn with_trailing_args(mut self) -> Self {
        self.trailing_args = true;
        self
    }

    pub fn with_handler(mut self, handler: CommandHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// clap Command로 변환 (하위 명령 포함)
    pub fn to_clap(&self) -> clap::Command {
        let mut cmd = clap::Command::new(self.name.clone()).about(self.short.clone());

        if !self.usage.is_empty() {
            cmd = cmd.override_usage(self.usage.clone());
        }
        if !self.long.is_empty() {
            cmd = cmd.long_about(self.long.clone());
        }
        if !self.example.is_empty() {
            cmd = cmd.after_help(self.example.clone());
        }
        for alias in &self.aliases {
            cmd = cmd.visible_alias(alias.clone());
        }
        if self.hidden {
            cmd = cmd.hide(true);
        }

        for flag in &self.flags {
            cmd = cmd.arg(flag.to_clap());
        }

        if self.trailing_args {
            cmd = cmd.arg(
                Arg::new("args")
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true),
            );
        }

        for sub in &self.subcommands {
            cmd = cmd.subcommand(sub.to_clap());
        }

        cmd
    }

    /// 파싱 결과를 따라 내려가며 가장 깊은 핸들러 실행
    fn dispatch_matches<'a>(
        &'a self,
        matches: &'a ArgMatches,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some((sub_name, sub_matches)) = matches.subcommand() {
                if let Some(sub) = self
                    .subcommands
                    .iter()
                    .find(|s| s.name == sub_name || s.aliases.iter().any(|a| a == sub_name))
                {
                    return sub.dispatch_matches(sub_matches).await;
                }
            }

            match &self.handler {
                Some(handler) => handler(matches.clone()).await,
                None => Err(Error::CommandNotFound(self.name.clone())),
            }
        })
    }
}

// ============================================================================
// Command Registry (startup phase)
// ============================================================================

/// 명령 레지스트리 - 이름 -> 정의
///
/// 등록은 시작 단계에서만 일어나므로 락 없이 `&mut self`로 처리합니다.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDefinition>,
}

impl CommandRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 명령 등록 (이름이 비면 실패, 같은 이름은 교체)
    pub fn register(&mut self, def: CommandDefinition) -> Result<()> {
        if def.name.is_empty() {
            return Err(Error::InvalidCommandName);
        }
        self.commands.insert(def.name.clone(), def);
        Ok(())
    }

    /// 명령 조회
    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    /// 모든 명령 (방어적 복사)
    pub fn all(&self) -> HashMap<String, CommandDefinition> {
        self.commands.clone()
    }

    /// 명령 수
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 등록된 모든 명령을 clap 루트에 추가
    pub fn attach_to(&self, mut root: clap::Command) -> clap::Command {
        for def in self.commands.values() {
            root = root.subcommand(def.to_clap());
        }
        root
    }

    /// 최상위 명령 이름과 파싱 결과로 핸들러 실행
    pub async fn dispatch(&self, name: &str, matches: &ArgMatches) -> Result<()> {
        let def = self
            .commands
            .values()
            .find(|d| d.name == name || d.aliases.iter().any(|a| a == name))
            .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;

        def.dispatch_matches(matches).await
    }
}
