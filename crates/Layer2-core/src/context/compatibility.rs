//! Compatibility Bridge - 레거시 필드와 확장 맵의 양방향 동기화
//!
//! 마이그레이션 기간 동안 레거시 평탄 필드와 `extensions["docker"]`
//! 항목 중 어느 쪽을 읽어도 같은 값을 관찰하도록 유지합니다. 두 함수
//! 모두 상태 없는 순수 변환이고 멱등입니다.

use super::{ContainerStatus, ProjectContext};
use serde_json::{json, Value};
use std::collections::HashMap;

/// 레거시 필드가 추적하는 확장 이름
pub const DOCKER_EXTENSION: &str = "docker";

/// 확장 데이터 -> 레거시 필드 복사
///
/// `extensions["docker"]`가 없거나 객체가 아니면 아무것도 하지 않습니다.
/// 확장 데이터에 없는 키는 레거시 필드를 건드리지 않습니다 (키가
/// 빠졌다고 필드를 0값으로 되돌리지 않는다).
pub fn populate_compatibility_fields(ctx: &mut ProjectContext) {
    let Some(Value::Object(docker)) = ctx.extensions.get(DOCKER_EXTENSION) else {
        return;
    };
    let docker = docker.clone();

    if let Some(files) = docker.get("compose_files").and_then(Value::as_array) {
        ctx.compose_files = files
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
    }

    if let Some(path) = docker.get("compose_override").and_then(Value::as_str) {
        if !path.is_empty() {
            ctx.compose_override = Some(path.to_string());
        }
    }

    if let Some(running) = docker.get("docker_running").and_then(Value::as_bool) {
        ctx.docker_running = running;
    }

    if let Some(status) = docker.get("containers_status") {
        if let Ok(map) = serde_json::from_value::<HashMap<String, ContainerStatus>>(status.clone())
        {
            ctx.containers_status = map;
        }
    }
}

/// 레거시 필드 -> 확장 데이터 갱신 (역방향)
///
/// 어느 레거시 필드든 기본값이 아닌 데이터를 담고 있으면, 채워진 필드만으로
/// 새 확장 데이터를 만들어 `extensions["docker"]`를 교체합니다. 레거시
/// 필드가 모두 비어 있으면 확장 키를 건드리지 않습니다 (레거시 데이터의
/// 부재가 확장 데이터의 부재를 뜻하지 않는다).
pub fn update_extensions_from_compatibility(ctx: &mut ProjectContext) {
    let has_docker_data = !ctx.compose_files.is_empty()
        || ctx.compose_override.as_deref().is_some_and(|s| !s.is_empty())
        || ctx.docker_running
        || !ctx.containers_status.is_empty();

    if !has_docker_data {
        return;
    }

    let mut docker = serde_json::Map::new();

    if !ctx.compose_files.is_empty() {
        docker.insert("compose_files".into(), json!(ctx.compose_files));
    }

    if let Some(path) = ctx.compose_override.as_deref() {
        if !path.is_empty() {
            docker.insert("compose_override".into(), json!(path));
        }
    }

    docker.insert("docker_running".into(), json!(ctx.docker_running));

    if !ctx.containers_status.is_empty() {
        if let Ok(status) = serde_json::to_value(&ctx.containers_status) {
            docker.insert("containers_status".into(), status);
        }
    }

    ctx.extensions
        .insert(DOCKER_EXTENSION.to_string(), Value::Object(docker));
}
