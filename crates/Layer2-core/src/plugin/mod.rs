//! # Plugin System
//!
//! Compass 확장 플러그인 시스템
//!
//! ## 개요
//!
//! 독립적으로 작성된 플러그인이 충돌 없이 자신을 등록하고 기능을
//! 기여할 수 있습니다:
//! - CLI 명령 트리에 명령 추가
//! - 프로젝트 컨텍스트에 확장 데이터 기여
//! - 특정 명령을 가로채는 전용 실행자 제공
//! - 셸 자동완성 제공
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PluginRegistry                           │
//! │  ┌────────────┬────────────┬──────────────────────────┐   │
//! │  │ docker     │ git        │ third-party …            │   │
//! │  │ (builtin)  │ (builtin)  │                          │   │
//! │  └────────────┴────────────┴──────────────────────────┘   │
//! │        │ provide_context        │ provide_executor         │
//! │        ▼                        ▼                          │
//! │  ExtensionRegistry        ExecutorRegistry                 │
//! │  (context detection)      (command routing)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! 플러그인 등록은 시작 단계에서 완료되어야 하며, 이후의 조회는
//! 읽기 락과 방어적 복사로 안전하게 병행 수행됩니다.

mod completion;
mod metadata;
mod registry;
mod traits;

pub use completion::{
    dynamic_completion, static_completion, CompletionFunc, CompletionRegistry,
};
pub use metadata::{CommandInfo, PluginMetadata};
pub use registry::{global_registry, PluginRegistry};
pub use traits::{Plugin, PluginCapability};
