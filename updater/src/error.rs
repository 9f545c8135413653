//! 버전 확인 에러 타입
//!
//! ## 지원하는 에러 상황
//! - 네트워크 끊김 / 프록시 실패
//! - 타임아웃
//! - API 응답 오류 (4xx, 5xx, 레이트 리밋)
//! - 응답 JSON 파싱 실패, `tag_name` 누락

use serde::{Deserialize, Serialize};
use std::fmt;

/// 업데이터 에러 타입
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum UpdaterError {
    /// 네트워크 연결 실패
    NetworkError {
        message: String,
        recoverable: bool,
    },
    /// HTTP 요청 타임아웃
    Timeout {
        operation: String,
        duration_secs: u64,
    },
    /// API 응답 오류
    ApiError {
        status_code: u16,
        message: String,
    },
    /// 응답 본문이 기대한 형식이 아님
    InvalidResponse {
        message: String,
    },
    /// 설정 오류
    ConfigError {
        message: String,
    },
}

impl fmt::Display for UpdaterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdaterError::NetworkError { message, .. } => {
                write!(f, "Network error: {}", message)
            }
            UpdaterError::Timeout { operation, duration_secs } => {
                write!(f, "Timeout after {}s: {}", duration_secs, operation)
            }
            UpdaterError::ApiError { status_code, message } => {
                write!(f, "API error ({}): {}", status_code, message)
            }
            UpdaterError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            UpdaterError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for UpdaterError {}

impl UpdaterError {
    /// 다른 전송 경로(프록시)로 재시도할 가치가 있는지
    pub fn is_recoverable(&self) -> bool {
        match self {
            UpdaterError::NetworkError { recoverable, .. } => *recoverable,
            UpdaterError::Timeout { .. } => true,
            // 5xx 에러는 재시도 가능, 4xx는 불가능
            UpdaterError::ApiError { status_code, .. } => *status_code >= 500,
            UpdaterError::InvalidResponse { .. } => false,
            UpdaterError::ConfigError { .. } => false,
        }
    }

    /// 사용자에게 표시할 메시지
    pub fn user_message(&self) -> String {
        match self {
            UpdaterError::NetworkError { .. } => {
                "인터넷 연결을 확인해주세요.".to_string()
            }
            UpdaterError::Timeout { .. } => {
                "서버 응답이 지연되고 있습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            UpdaterError::ApiError { status_code, .. } => {
                if *status_code == 404 {
                    "릴리스 정보를 찾을 수 없습니다.".to_string()
                } else if *status_code == 403 || *status_code == 429 {
                    "접근이 거부되었습니다. API 제한일 수 있습니다.".to_string()
                } else if *status_code >= 500 {
                    "서버에 일시적인 문제가 있습니다. 잠시 후 다시 시도해주세요.".to_string()
                } else {
                    format!("서버 오류 ({})", status_code)
                }
            }
            UpdaterError::InvalidResponse { .. } => {
                "릴리스 정보를 해석하지 못했습니다.".to_string()
            }
            UpdaterError::ConfigError { message } => {
                format!("설정 오류: {}", message)
            }
        }
    }

    /// reqwest 에러를 UpdaterError로 변환
    pub fn from_reqwest(err: &reqwest::Error, operation: &str, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            UpdaterError::Timeout {
                operation: operation.to_string(),
                duration_secs: timeout_secs,
            }
        } else if err.is_decode() {
            UpdaterError::InvalidResponse {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            UpdaterError::NetworkError {
                message: format!("연결 실패: {}", err),
                recoverable: true,
            }
        } else if let Some(status) = err.status() {
            UpdaterError::ApiError {
                status_code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            UpdaterError::NetworkError {
                message: err.to_string(),
                recoverable: err.is_request() || err.is_body(),
            }
        }
    }
}
