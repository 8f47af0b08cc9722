//! Compass CLI - Main entry point
//!
//! 시작 순서: tracing 초기화 -> 내장 플러그인 등록 -> 설정 로드/주입 ->
//! 명령 트리 구성(`load_all`) -> 파싱 -> 디스패치.

mod config;
mod plugins_builtin;

use anyhow::Context as _;
use compass_core::{
    detect_with_plugins, global_registry, handler, CommandDefinition, CommandRegistry,
    CompletionRegistry, Options, PluginAwareExecutor, ShellCommand, StdioMode,
};
use compass_foundation::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    plugins_builtin::register_builtins()
        .await
        .context("built-in plugin registration failed")?;
    let registry = global_registry();

    let working_dir = std::env::current_dir().context("cannot determine working directory")?;
    let cfg = config::load(&working_dir)?;
    registry.set_config(cfg).await;

    // 고정 명령 + 플러그인 명령으로 트리 구성
    let mut commands = CommandRegistry::new();
    for def in [
        context_command(),
        plugins_command(),
        run_command(),
        complete_command(),
    ] {
        commands.register(def)?;
    }

    let root = clap::Command::new("compass")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Context-aware development workflow orchestrator")
        .subcommand_required(true)
        .arg_required_else_help(true);
    let root = commands.attach_to(root);
    let root = registry.load_all(root).await?;

    // 플러그인 명령 정의는 디스패치용으로만 추가 등록한다
    // (clap 트리에는 load_all이 이미 부착했다)
    for plugin in registry.list().await {
        for def in plugin.provide_commands() {
            commands.register(def)?;
        }
    }

    let matches = root.get_matches();
    let (name, sub_matches) = matches
        .subcommand()
        .context("a subcommand is required")?;

    if let Err(e) = commands.dispatch(name, sub_matches).await {
        // 자식 프로세스의 종료 코드는 그대로 우리 종료 코드가 된다
        if let Error::CommandFailed { code, .. } = &e {
            eprintln!("{e}");
            std::process::exit(*code);
        }
        return Err(e.into());
    }

    Ok(())
}

/// `context` - 감지된 프로젝트 컨텍스트를 JSON으로 출력
fn context_command() -> CommandDefinition {
    CommandDefinition::new("context")
        .with_short("Print the detected project context as JSON")
        .with_handler(handler(|_matches| async move {
            let plugins = global_registry().list().await;
            let ctx = detect_with_plugins(&plugins).await;

            println!("{}", serde_json::to_string_pretty(&ctx)?);
            Ok(())
        }))
}

/// `plugins` - 설치된 플러그인 목록 출력
fn plugins_command() -> CommandDefinition {
    CommandDefinition::new("plugins")
        .with_short("List installed plugins")
        .with_handler(handler(|_matches| async move {
            let plugins = global_registry().list().await;
            if plugins.is_empty() {
                println!("No plugins installed");
                return Ok(());
            }

            let mut metadata: Vec<_> = plugins.iter().map(|p| p.metadata()).collect();
            metadata.sort_by(|a, b| a.name.cmp(&b.name));

            for meta in metadata {
                let aliases = if meta.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" (aliases: {})", meta.aliases.join(", "))
                };
                println!("{} {}{} - {}", meta.name, meta.version, aliases, meta.description);
            }
            Ok(())
        }))
}

/// `run` - 플러그인 라우팅을 거쳐 임의 명령 실행
fn run_command() -> CommandDefinition {
    CommandDefinition::new("run")
        .with_usage("run <command> [args...]")
        .with_short("Run a command through plugin-aware routing")
        .with_example("compass run docker-compose up -d")
        .with_trailing_args()
        .with_handler(handler(|matches| async move {
            let words: Vec<String> = matches
                .get_many::<String>("args")
                .map(|v| v.cloned().collect())
                .unwrap_or_default();
            let Some((program, args)) = words.split_first() else {
                return Err(Error::InvalidInput("no command given to run".into()));
            };

            // 단어 하나면 인용된 명령줄로 보고 셸 규칙으로 쪼갠다
            let cmd = if args.is_empty() {
                ShellCommand::parse(program)?.with_stdio(StdioMode::Passthrough)
            } else {
                ShellCommand::passthrough(program).with_args(args.iter().cloned())
            };
            let executor = PluginAwareExecutor::new(Options::default());

            // Ctrl-C로 자식 프로세스까지 중단
            let token = CancellationToken::new();
            let cancel = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            let result = executor.execute_cancellable(&cmd, token).await?;
            if result.success() {
                Ok(())
            } else {
                Err(Error::CommandFailed {
                    program: cmd.program,
                    code: result.exit_code,
                })
            }
        }))
}

/// `__complete` - 셸 자동완성 후보 출력 (셸 스크립트가 호출하는 숨김 경로)
fn complete_command() -> CommandDefinition {
    CommandDefinition::new("__complete")
        .with_usage("__complete <command> [args...] <word>")
        .with_short("Print completion candidates for a command")
        .hidden()
        .with_trailing_args()
        .with_handler(handler(|matches| async move {
            let words: Vec<String> = matches
                .get_many::<String>("args")
                .map(|v| v.cloned().collect())
                .unwrap_or_default();
            let Some((command, rest)) = words.split_first() else {
                return Ok(());
            };
            let (args, to_complete) = match rest.split_last() {
                Some((last, init)) => (init.to_vec(), last.clone()),
                None => (vec![], String::new()),
            };

            let mut completions = CompletionRegistry::new();
            for plugin in global_registry().list().await {
                if !plugin
                    .capabilities()
                    .contains(&compass_core::PluginCapability::ContributesCompletions)
                {
                    continue;
                }
                for (name, func) in plugin.provide_completions() {
                    completions.register(name, func)?;
                }
            }

            for candidate in completions.complete(command, &args, &to_complete) {
                println!("{candidate}");
            }
            Ok(())
        }))
}
