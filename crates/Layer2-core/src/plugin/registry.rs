//! Plugin Registry - 플러그인 저장소
//!
//! 설치된 플러그인의 단일 진실 공급원입니다. 이름/별칭 충돌을 등록
//! 시점에 원자적으로 검사하고, 설정 전파와 명령 트리 등록을 주도합니다.

use super::traits::Plugin;
use compass_foundation::{Config, Error, LoadPhase, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 이름/별칭 테이블 (하나의 락으로 보호해 등록을 원자적으로 유지)
#[derive(Default)]
struct Tables {
    /// 기본 이름 -> 플러그인
    plugins: HashMap<String, Arc<dyn Plugin>>,

    /// 별칭 -> 기본 이름 (별칭은 별칭을 가리키지 않는다)
    aliases: HashMap<String, String>,
}

/// 플러그인 레지스트리
pub struct PluginRegistry {
    tables: RwLock<Tables>,

    /// 병합된 설정 트리 (load_all에서 각 플러그인에 전파)
    config: RwLock<Config>,
}

impl PluginRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            config: RwLock::new(Config::new()),
        }
    }

    /// 플러그인 등록
    ///
    /// 이름이 기존 이름/별칭과 겹치거나, 별칭 중 하나라도 충돌하면
    /// 아무것도 등록하지 않고 실패합니다 (all-or-nothing).
    pub async fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();
        if name.is_empty() {
            return Err(Error::InvalidPlugin);
        }

        let meta = plugin.metadata();
        let mut tables = self.tables.write().await;

        if tables.plugins.contains_key(&name) || tables.aliases.contains_key(&name) {
            return Err(Error::DuplicatePluginName(name));
        }

        // 모든 별칭을 먼저 검사한 뒤에만 삽입한다
        for alias in &meta.aliases {
            if tables.plugins.contains_key(alias) || tables.aliases.contains_key(alias) {
                return Err(Error::DuplicatePluginAlias(alias.clone()));
            }
        }

        for alias in &meta.aliases {
            tables.aliases.insert(alias.clone(), name.clone());
        }
        tables.plugins.insert(name.clone(), plugin);

        info!("Registered plugin: {} (v{})", name, meta.version);
        Ok(())
    }

    /// 이름 또는 별칭으로 플러그인 조회 (별칭 해석은 한 단계)
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        let tables = self.tables.read().await;

        if let Some(plugin) = tables.plugins.get(name) {
            return Some(Arc::clone(plugin));
        }

        tables
            .aliases
            .get(name)
            .and_then(|canonical| tables.plugins.get(canonical))
            .map(Arc::clone)
    }

    /// 모든 플러그인 (방어적 복사, 순서 비보장)
    pub async fn list(&self) -> Vec<Arc<dyn Plugin>> {
        let tables = self.tables.read().await;
        tables.plugins.values().map(Arc::clone).collect()
    }

    /// 설정 트리 교체
    pub async fn set_config(&self, config: Config) {
        *self.config.write().await = config;
    }

    /// 모든 플러그인의 configure + register 수행
    ///
    /// 어느 단계에서든 실패하면 해당 플러그인과 단계를 담아 즉시 중단합니다.
    /// 이미 처리된 플러그인은 되돌리지 않습니다.
    pub async fn load_all(&self, mut root: clap::Command) -> Result<clap::Command> {
        let tables = self.tables.read().await;
        let config = self.config.read().await;

        for (name, plugin) in tables.plugins.iter() {
            plugin
                .configure(&config)
                .map_err(|e| Error::plugin_load(name.clone(), LoadPhase::Configure, e))?;

            root = plugin
                .register(root)
                .map_err(|e| Error::plugin_load(name.clone(), LoadPhase::Register, e))?;

            debug!("Loaded plugin: {}", name);
        }

        Ok(root)
    }

    /// 별칭을 기본 이름으로 해석
    pub async fn resolve_alias(&self, alias: &str) -> Option<String> {
        let tables = self.tables.read().await;
        tables.aliases.get(alias).cloned()
    }

    /// 플러그인의 별칭 목록
    pub async fn aliases_of(&self, name: &str) -> Vec<String> {
        let tables = self.tables.read().await;
        match tables.plugins.get(name) {
            Some(plugin) => plugin.metadata().aliases,
            None => vec![],
        }
    }

    /// 별칭 여부 확인
    pub async fn is_alias(&self, name: &str) -> bool {
        let tables = self.tables.read().await;
        tables.aliases.contains_key(name)
    }

    /// 플러그인 존재 여부 확인 (이름 또는 별칭)
    pub async fn contains(&self, name: &str) -> bool {
        let tables = self.tables.read().await;
        tables.plugins.contains_key(name) || tables.aliases.contains_key(name)
    }

    /// 플러그인 수
    pub async fn len(&self) -> usize {
        let tables = self.tables.read().await;
        tables.plugins.len()
    }

    /// 비어있는지 확인
    pub async fn is_empty(&self) -> bool {
        let tables = self.tables.read().await;
        tables.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Global registry (프로세스 전역 기본 인스턴스)
// ============================================================================

static GLOBAL_REGISTRY: OnceLock<Arc<PluginRegistry>> = OnceLock::new();

/// 전역 플러그인 레지스트리
///
/// 편의용 기본 인스턴스일 뿐이며, 테스트는 독립 인스턴스를 생성해야 합니다.
pub fn global_registry() -> Arc<PluginRegistry> {
    GLOBAL_REGISTRY
        .get_or_init(|| Arc::new(PluginRegistry::new()))
        .clone()
}
