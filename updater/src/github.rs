//! GitHub Release API 클라이언트
//!
//! `releases/latest` 엔드포인트에서 최신 정식 릴리스 정보를 가져옵니다.
//! 먼저 프록시 없이 직접 연결을 시도하고, 실패하면 시스템/환경 변수 프록시를
//! 사용해 한 번 더 시도합니다.

use serde::Deserialize;
use std::time::Duration;

use crate::error::UpdaterError;
use crate::UpdateConfig;

/// GitHub Release 응답 (필요한 필드만)
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub name: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    pub published_at: Option<String>,
}

/// 요청 전송 경로
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// 프록시를 전혀 쓰지 않음
    Direct,
    /// 시스템/환경 변수 프록시 사용
    SystemProxy,
}

impl TransportMode {
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Direct => "no-proxy",
            TransportMode::SystemProxy => "proxy",
        }
    }
}

/// GitHub API 클라이언트
pub struct GitHubClient {
    owner: String,
    repo: String,
    /// API 베이스 URL (기본: "https://api.github.com")
    /// 미러나 로컬 mock 서버 테스트 시 오버라이드
    base_url: String,
    current_version: String,
    timeout: Duration,
    direct: reqwest::Client,
    /// None이면 프록시 재시도 안 함
    proxied: Option<reqwest::Client>,
}

impl GitHubClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.github.com";

    pub fn new(owner: &str, repo: &str, current_version: &str) -> Result<Self, UpdaterError> {
        let config = UpdateConfig {
            github_owner: owner.to_string(),
            github_repo: repo.to_string(),
            ..Default::default()
        };
        Self::from_config(&config, current_version)
    }

    /// 설정에서 클라이언트 생성 (base_url, 타임아웃, 프록시 재시도 여부 반영)
    pub fn from_config(config: &UpdateConfig, current_version: &str) -> Result<Self, UpdaterError> {
        if config.github_owner.trim().is_empty() || config.github_repo.trim().is_empty() {
            return Err(UpdaterError::ConfigError {
                message: "github_owner and github_repo must be set".to_string(),
            });
        }

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let user_agent = format!("PasteMD/{}", current_version);

        let build = |mode: TransportMode| {
            let mut builder = reqwest::Client::builder()
                .user_agent(user_agent.clone())
                .timeout(timeout);
            if mode == TransportMode::Direct {
                builder = builder.no_proxy();
            }
            builder.build().map_err(|e| UpdaterError::ConfigError {
                message: format!("Failed to create HTTP client ({}): {}", mode.label(), e),
            })
        };

        let direct = build(TransportMode::Direct)?;
        let proxied = if config.proxy_fallback {
            Some(build(TransportMode::SystemProxy)?)
        } else {
            None
        };

        Ok(Self {
            owner: config.github_owner.clone(),
            repo: config.github_repo.clone(),
            base_url: config
                .api_base_url
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(Self::DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            current_version: current_version.to_string(),
            timeout,
            direct,
            proxied,
        })
    }

    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url, self.owner, self.repo
        )
    }

    /// 최신 릴리스 가져오기 (직접 연결 → 프록시 순)
    pub async fn fetch_latest_release(&self) -> Result<GitHubRelease, UpdaterError> {
        tracing::info!("[Updater] Checking version ({})...", TransportMode::Direct.label());
        let first = self.fetch_with(&self.direct, TransportMode::Direct).await;

        let err = match first {
            Ok(release) => return Ok(release),
            Err(e) => e,
        };
        tracing::warn!(
            "[Updater] Network error while checking version ({}): {}",
            TransportMode::Direct.label(),
            err
        );

        let proxied = match (&self.proxied, &err) {
            // 본문 해석 실패는 경로를 바꿔도 같은 결과
            (_, UpdaterError::InvalidResponse { .. }) => return Err(err),
            (None, _) => return Err(err),
            (Some(client), _) => client,
        };

        tracing::info!("[Updater] Direct check failed, retrying with system proxy...");
        self.fetch_with(proxied, TransportMode::SystemProxy)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "[Updater] Network error while checking version ({}): {}",
                    TransportMode::SystemProxy.label(),
                    e
                );
                e
            })
    }

    async fn fetch_with(
        &self,
        http: &reqwest::Client,
        mode: TransportMode,
    ) -> Result<GitHubRelease, UpdaterError> {
        let url = self.latest_release_url();
        let operation = format!("GET {} ({})", url, mode.label());
        let timeout_secs = self.timeout.as_secs();

        let response = http
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("version", self.current_version.as_str())
            .send()
            .await
            .map_err(|e| UpdaterError::from_reqwest(&e, &operation, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpdaterError::ApiError {
                status_code: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| UpdaterError::from_reqwest(&e, &operation, timeout_secs))?;

        serde_json::from_str::<GitHubRelease>(&text).map_err(|e| {
            tracing::warn!("[Updater] Failed to parse GitHub API response: {}", e);
            UpdaterError::InvalidResponse {
                message: e.to_string(),
            }
        })
    }
}
