//! Built-in Plugin Registration - 시작 시 전역 레지스트리에 내장 플러그인 등록
//!
//! 여기서의 중복 등록은 프로그래머 오류이므로 시작을 중단시킵니다.

use anyhow::Context as _;
use compass_core::{global_executor_registry, global_registry, PluginCapability};
use compass_plugins::DockerPlugin;
use std::sync::Arc;
use tracing::debug;

/// 내장 플러그인 전부 등록
///
/// 플러그인 레지스트리 등록과 함께, 실행자 기능을 선언한 플러그인의
/// 제공자를 전역 실행자 레지스트리에도 연결합니다.
pub async fn register_builtins() -> anyhow::Result<()> {
    let registry = global_registry();
    let executors = global_executor_registry();

    let builtins: Vec<Arc<dyn compass_core::Plugin>> = vec![Arc::new(DockerPlugin::new())];

    for plugin in builtins {
        let name = plugin.name().to_string();

        if plugin
            .capabilities()
            .contains(&PluginCapability::ContributesExecutor)
        {
            if let Some(provider) = plugin.provide_executor() {
                executors
                    .register(provider)
                    .await
                    .with_context(|| {
                        format!("built-in plugin {name} executor registration failed")
                    })?;
            }
        }

        registry
            .register(plugin)
            .await
            .with_context(|| format!("built-in plugin {name} registration failed"))?;

        debug!(plugin = %name, "built-in plugin registered");
    }

    Ok(())
}
