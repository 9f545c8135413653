//! 버전 확인기 — 원샷 체크 유틸리티
//!
//! GitHub에서 최신 릴리스 태그를 가져와 실행 중인 버전과 비교합니다.
//! 트레이 메뉴나 CLI의 `check` 명령이 주기적으로 호출합니다.

use serde::{Deserialize, Serialize};

use crate::error::UpdaterError;
use crate::github::{GitHubClient, GitHubRelease};
use crate::version::{self, ParsedVersion};

/// 릴리스 노트 최대 길이 (문자 수)
pub const RELEASE_NOTES_LIMIT: usize = 200;

const NO_RELEASE_NOTES: &str = "No release notes";

/// 한 번의 버전 확인 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCheck {
    pub has_update: bool,
    /// 앞쪽 `v`를 모두 뗀 최신 태그
    pub latest_version: String,
    pub current_version: String,
    /// 업데이트가 있을 때만 채워짐
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
    pub checked_at: String,
}

/// 최신 릴리스와 현재 버전을 비교하는 확인기
pub struct VersionChecker {
    current_version: String,
    client: GitHubClient,
}

impl VersionChecker {
    pub fn new(current_version: &str, client: GitHubClient) -> Self {
        Self {
            current_version: current_version.to_string(),
            client,
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// 최신 릴리스를 가져와 비교합니다.
    pub async fn check_update(&self) -> Result<UpdateCheck, UpdaterError> {
        let release = self.client.fetch_latest_release().await?;
        let check = evaluate_release(&release, &self.current_version)?;

        if check.has_update {
            tracing::info!(
                "[Updater] New version available: {} (current {})",
                check.latest_version,
                check.current_version
            );
        } else {
            tracing::info!("[Updater] Already on latest version: {}", self.current_version);
        }
        Ok(check)
    }

    /// 실패를 로그로만 남기고 `None`을 돌려주는 버전 (트레이 백그라운드 체크용)
    pub async fn check_update_or_none(&self) -> Option<UpdateCheck> {
        match self.check_update().await {
            Ok(check) => Some(check),
            Err(e) => {
                tracing::warn!("[Updater] Version check failed: {}", e);
                None
            }
        }
    }
}

/// 릴리스 응답을 확인 결과로 변환 (네트워크와 무관한 순수 단계)
pub fn evaluate_release(
    release: &GitHubRelease,
    current_version: &str,
) -> Result<UpdateCheck, UpdaterError> {
    let tag = release.tag_name.trim();
    let latest_version = tag.trim_start_matches('v').to_string();
    if latest_version.is_empty() {
        tracing::warn!("[Updater] Failed to parse latest version from GitHub");
        return Err(UpdaterError::InvalidResponse {
            message: "missing tag_name".to_string(),
        });
    }

    for (label, raw) in [("latest", latest_version.as_str()), ("current", current_version)] {
        if let Err(warning) = ParsedVersion::parse_checked(raw) {
            tracing::debug!("[Updater] Unparseable {} version '{}': {}", label, raw, warning);
        }
    }

    let has_update = version::is_newer(&latest_version, current_version);
    let (release_url, release_notes) = if has_update {
        // 본문 키가 없을 때만 기본 문구, 빈 본문은 그대로
        let notes = release.body.as_deref().unwrap_or(NO_RELEASE_NOTES);
        (
            Some(release.html_url.clone()),
            Some(notes.chars().take(RELEASE_NOTES_LIMIT).collect()),
        )
    } else {
        (None, None)
    };

    Ok(UpdateCheck {
        has_update,
        latest_version,
        current_version: current_version.to_string(),
        release_url,
        release_notes,
        checked_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// 체크 결과를 JSON 문자열로 직렬화 (프로세스 간 통신용)
///
/// 실패 시 `{"error": ..., "error_type": ..., "recoverable": ...}` 형태입니다.
pub fn result_to_json(result: &Result<UpdateCheck, UpdaterError>) -> String {
    let value = match result {
        Ok(check) => serde_json::to_value(check).unwrap_or_default(),
        Err(e) => {
            let error_type = serde_json::to_value(e)
                .ok()
                .and_then(|v| v.get("type").cloned())
                .unwrap_or(serde_json::Value::Null);
            serde_json::json!({
                "error": e.to_string(),
                "error_type": error_type,
                "recoverable": e.is_recoverable(),
            })
        }
    };
    value.to_string()
}

/// 프로세스 종료 코드 결정
///
/// - `0` — 업데이트 있음 (호출측에서 알림 표시)
/// - `1` — 체크 실패 (에러)
/// - `2` — 업데이트 없음 (조용히 종료)
pub fn exit_code(result: &Result<UpdateCheck, UpdaterError>) -> i32 {
    match result {
        Err(_) => 1,
        Ok(check) if check.has_update => 0,
        Ok(_) => 2,
    }
}
