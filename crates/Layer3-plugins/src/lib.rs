//! compass-plugins: Built-in Plugins for Compass
//!
//! Layer3 - 내장 플러그인 레이어
//!
//! # 주요 모듈
//!
//! - `docker`: Docker Compose 감지 + `docker` 명령 + compose 실행 라우팅

pub mod docker;

pub use docker::{DockerPlugin, DockerSettings};

/// Layer3 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
