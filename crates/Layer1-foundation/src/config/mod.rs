//! Config - 병합된 설정 트리
//!
//! 플러그인 이름을 키로 하는 설정 섹션 모음입니다. 설정 파일의 문법 파싱은
//! 상위 레이어(CLI)의 책임이고, 여기서는 이미 파싱된 구조화 데이터만 다룹니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 병합된 설정 트리 (플러그인 이름 -> 플러그인별 설정)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    sections: HashMap<String, Value>,
}

impl Config {
    /// 빈 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 파싱된 섹션 맵으로부터 생성
    pub fn from_sections(sections: HashMap<String, Value>) -> Self {
        Self { sections }
    }

    /// 플러그인별 설정 섹션 조회
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    /// 설정 섹션 추가/교체
    pub fn set_section(&mut self, name: impl Into<String>, value: Value) {
        self.sections.insert(name.into(), value);
    }

    /// 섹션 존재 여부 확인
    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// 섹션 수
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// 모든 섹션 (방어적 복사)
    pub fn sections(&self) -> HashMap<String, Value> {
        self.sections.clone()
    }
}
