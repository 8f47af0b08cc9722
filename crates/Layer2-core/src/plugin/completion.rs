//! Completion Registry - 플러그인 셸 자동완성
//!
//! 명령 이름별 자동완성 함수를 보관합니다. CLI는 숨겨진 완성 요청
//! 경로에서 이 레지스트리를 조회합니다.

use compass_foundation::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// 자동완성 함수 - 현재 인자 목록과 입력 중인 단어를 받아 후보를 반환
pub type CompletionFunc = Arc<dyn Fn(&[String], &str) -> Vec<String> + Send + Sync>;

/// 자동완성 레지스트리 (명령 이름 -> 완성 함수)
#[derive(Default)]
pub struct CompletionRegistry {
    completions: HashMap<String, CompletionFunc>,
}

impl CompletionRegistry {
    /// 새 레지스트리 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 명령에 대한 완성 함수 등록
    pub fn register(&mut self, command_name: impl Into<String>, func: CompletionFunc) -> Result<()> {
        let name = command_name.into();
        if name.is_empty() {
            return Err(Error::InvalidCompletionProvider);
        }

        self.completions.insert(name, func);
        Ok(())
    }

    /// 완성 함수 조회
    pub fn get(&self, command_name: &str) -> Option<&CompletionFunc> {
        self.completions.get(command_name)
    }

    /// 후보 계산 (미등록 명령은 빈 목록)
    pub fn complete(&self, command_name: &str, args: &[String], to_complete: &str) -> Vec<String> {
        match self.completions.get(command_name) {
            Some(func) => func(args, to_complete),
            None => vec![],
        }
    }

    /// 등록된 명령 수
    pub fn len(&self) -> usize {
        self.completions.len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }
}

// ============================================================================
// Helpers (자주 쓰는 완성 패턴)
// ============================================================================

/// 고정 후보 목록으로 완성 함수 생성
pub fn static_completion(options: Vec<String>) -> CompletionFunc {
    Arc::new(move |_args, to_complete| {
        options
            .iter()
            .filter(|o| o.starts_with(to_complete))
            .cloned()
            .collect()
    })
}

/// 호출 시점에 후보를 생성하는 완성 함수 생성
pub fn dynamic_completion(
    provider: impl Fn() -> Vec<String> + Send + Sync + 'static,
) -> CompletionFunc {
    Arc::new(move |_args, to_complete| {
        provider()
            .into_iter()
            .filter(|o| o.starts_with(to_complete))
            .collect()
    })
}
