//! Plugin Metadata - 플러그인 메타데이터 정의

use serde::{Deserialize, Serialize};

/// 플러그인이 선언하는 명령 정보 (도움말/목록 표시용)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInfo {
    /// 명령 이름
    pub name: String,

    /// 도움말 그룹화용 카테고리
    pub category: String,

    /// 설명
    pub description: String,
}

impl CommandInfo {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
        }
    }
}

/// 플러그인 메타데이터 - 정체성과 선언된 기여 목록
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// 고유 플러그인 이름 (불변)
    pub name: String,

    /// 시맨틱 버전 문자열
    pub version: String,

    /// 설명
    pub description: String,

    /// 작성자
    pub author: Option<String>,

    /// 대체 이름들 (이름 대신 사용 가능)
    pub aliases: Vec<String>,

    /// 선언된 명령 목록
    pub commands: Vec<CommandInfo>,
}

impl PluginMetadata {
    /// 새 메타데이터 생성
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            author: None,
            aliases: vec![],
            commands: vec![],
        }
    }

    /// 빌더 패턴: 설명 설정
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// 빌더 패턴: 작성자 설정
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// 빌더 패턴: 별칭 추가
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// 빌더 패턴: 명령 추가
    pub fn with_command(mut self, command: CommandInfo) -> Self {
        self.commands.push(command);
        self
    }
}
