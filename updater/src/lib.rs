//! # PasteMD 업데이터 라이브러리
//!
//! GitHub 릴리스를 기준으로 새 버전이 있는지 확인합니다.
//!
//! ## 구성
//! - **버전(version.rs)**: 버전 문자열 파싱/비교 (`dev` < `rc` < 정식)
//! - **GitHub(github.rs)**: `releases/latest` 조회, 직접 연결 실패 시 프록시 재시도
//! - **확인기(checker.rs)**: 조회 + 비교를 묶은 원샷 체크, CLI용 JSON/종료 코드
//! - **에러(error.rs)**: 네트워크 끊김, 타임아웃, API 오류 분류

pub mod checker;
pub mod error;
pub mod github;
pub mod version;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use checker::{UpdateCheck, VersionChecker};
pub use error::UpdaterError;
pub use github::{GitHubClient, GitHubRelease, TransportMode};
pub use version::{is_newer, ParseWarning, ParsedVersion, PreReleaseRank};

use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════
// 설정
// ══════════════════════════════════════════════════════

/// 업데이트 확인 설정 (`[updater]` 섹션)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub enabled: bool,
    /// GitHub 레포지토리 소유자
    pub github_owner: String,
    /// GitHub 레포지토리 이름
    pub github_repo: String,
    /// API 베이스 URL 오버라이드 (미러 또는 테스트용 로컬 서버,
    /// 예: "http://127.0.0.1:9876")
    pub api_base_url: Option<String>,
    /// 요청당 타임아웃 (초)
    pub timeout_secs: u64,
    /// 직접 연결 실패 시 시스템 프록시로 재시도
    pub proxy_fallback: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            github_owner: "RICHQAQ".to_string(),
            github_repo: "PasteMD".to_string(),
            api_base_url: None,
            timeout_secs: 5,
            proxy_fallback: true,
        }
    }
}

/// 설정으로부터 확인기를 만듭니다. 비활성화 상태면 에러.
pub fn checker_from_config(
    config: &UpdateConfig,
    current_version: &str,
) -> Result<VersionChecker, UpdaterError> {
    if !config.enabled {
        return Err(UpdaterError::ConfigError {
            message: "Updater is disabled".to_string(),
        });
    }
    let client = GitHubClient::from_config(config, current_version)?;
    Ok(VersionChecker::new(current_version, client))
}
