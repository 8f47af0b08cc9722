//! Executor Registry - 명령별 전용 실행자 라우팅 테이블
//!
//! 확장 레지스트리와 달리 같은 이름의 재등록을 거부합니다. 메타데이터
//! 교체와 달리 실행 동작의 교체는 눈에 보이는 부작용을 일으키므로
//! 충돌을 즉시 드러냅니다.

use super::{ExecResult, Options, ShellCommand};
use async_trait::async_trait;
use compass_foundation::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::info;

// ============================================================================
// Traits
// ============================================================================

/// 명령 실행자
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// 명령 실행
    async fn execute(&self, cmd: &ShellCommand) -> Result<ExecResult>;

    /// 취소 가능 실행
    ///
    /// 기본 구현은 취소를 무시하고 `execute`로 위임합니다. 취소를
    /// 지원하지 않는 실행자는 이 저하 동작을 그대로 사용합니다.
    async fn execute_cancellable(
        &self,
        cmd: &ShellCommand,
        _token: tokio_util::sync::CancellationToken,
    ) -> Result<ExecResult> {
        self.execute(cmd).await
    }
}

/// 실행자 제공자 - 플러그인이 특정 명령을 가로채는 진입점
pub trait ExecutorProvider: Send + Sync {
    /// 고유 제공자 이름
    fn name(&self) -> &str;

    /// 이 제공자가 해당 명령을 처리할 수 있는지 판정
    fn can_handle(&self, cmd: &ShellCommand) -> bool;

    /// 해당 명령용 실행자 생성
    fn create_executor(&self, options: Options) -> Arc<dyn CommandExecutor>;
}

// ============================================================================
// ExecutorRegistry
// ============================================================================

/// 실행자 제공자 레지스트리 (이름 -> 제공자)
pub struct ExecutorRegistry {
    providers: RwLock<HashMap<String, Arc<dyn ExecutorProvider>>>,
}

impl ExecutorRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// 제공자 등록
    ///
    /// 빈 이름과 중복 이름은 거부합니다. 같은 이름의 제공자를 바꾸려면
    /// 먼저 `unregister`해야 합니다.
    pub async fn register(&self, provider: Arc<dyn ExecutorProvider>) -> Result<()> {
        let name = provider.name().to_string();
        if name.is_empty() {
            return Err(Error::EmptyExecutorName);
        }

        let mut providers = self.providers.write().await;
        if providers.contains_key(&name) {
            return Err(Error::ExecutorAlreadyRegistered(name));
        }

        providers.insert(name.clone(), provider);
        info!("Executor provider registered: {}", name);
        Ok(())
    }

    /// 이름으로 제공자 조회
    pub async fn get(&self, name: &str) -> Option<Arc<dyn ExecutorProvider>> {
        let providers = self.providers.read().await;
        providers.get(name).map(Arc::clone)
    }

    /// 명령을 처리할 수 있는 첫 제공자 탐색
    ///
    /// 여러 제공자가 겹치면 어느 쪽이 선택될지 보장하지 않습니다.
    /// 판정 술어를 서로소로 유지하는 것은 플러그인 작성자의 몫입니다.
    pub async fn find_provider(&self, cmd: &ShellCommand) -> Option<Arc<dyn ExecutorProvider>> {
        let providers = self.providers.read().await;
        providers
            .values()
            .find(|p| p.can_handle(cmd))
            .map(Arc::clone)
    }

    /// 모든 제공자 (방어적 복사)
    pub async fn all(&self) -> HashMap<String, Arc<dyn ExecutorProvider>> {
        let providers = self.providers.read().await;
        providers.clone()
    }

    /// 제공자 제거 (미등록 이름은 무시)
    pub async fn unregister(&self, name: &str) {
        let mut providers = self.providers.write().await;
        providers.remove(name);
    }

    /// 모든 제공자 제거
    pub async fn clear(&self) {
        let mut providers = self.providers.write().await;
        providers.clear();
    }

    /// 등록된 제공자 수
    pub async fn len(&self) -> usize {
        let providers = self.providers.read().await;
        providers.len()
    }

    /// 비어있는지 확인
    pub async fn is_empty(&self) -> bool {
        let providers = self.providers.read().await;
        providers.is_empty()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Global Registry
// ============================================================================

static GLOBAL_EXECUTOR_REGISTRY: OnceLock<Arc<ExecutorRegistry>> = OnceLock::new();

/// 전역 실행자 레지스트리
pub fn global_executor_registry() -> Arc<ExecutorRegistry> {
    Arc::clone(GLOBAL_EXECUTOR_REGISTRY.get_or_init(|| Arc::new(ExecutorRegistry::new())))
}
