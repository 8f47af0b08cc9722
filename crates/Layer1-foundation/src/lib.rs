//! # compass-foundation
//!
//! Foundation layer for Compass:
//! - Error: 중앙 에러 타입 (등록 충돌, 로드 실패, 실행 실패)
//! - Config: 병합된 설정 트리 (플러그인 이름 -> 섹션)
//!
//! 이 레이어는 상위 레이어(core, plugins, cli)가 공유하는 최소한의
//! 타입만 제공하며, 외부 I/O를 수행하지 않습니다.

pub mod config;
pub mod error;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, LoadPhase, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::Config;
