//! 단일 인스턴스 IPC
//!
//! 이미 실행 중인 인스턴스가 있을 때 두 번째로 실행된 프로세스가
//! Unix 소켓으로 명령 한 줄을 보내고 종료합니다 (예: 설정 창 열기).
//!
//! ## 프로토콜
//! 연결당 UTF-8 한 줄 (`command\n`). 응답은 없습니다.
//! 서버는 최대 4096바이트까지 읽고, 앞뒤 공백을 제거한 뒤 비어 있지 않으면 핸들러로 넘깁니다.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 클라이언트 연결/쓰기 타임아웃
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
/// 연결당 최대 수신 바이트
pub const MAX_COMMAND_BYTES: u64 = 4096;

#[derive(thiserror::Error, Debug)]
pub enum IpcError {
    #[error("No running instance at {0}")]
    NotRunning(PathBuf),

    #[error("IPC timed out after {0:?}")]
    Timeout(Duration),

    #[error("Single-instance IPC is not supported on this platform")]
    Unsupported,

    #[error("IPC I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 소켓 경로: `{dir}/{app_name}.sock`
pub fn socket_path(app_name: &str, dir: &Path) -> PathBuf {
    dir.join(format!("{}.sock", app_name))
}

/// 인스턴스 간 명령
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceCommand {
    /// 설정 창 표시
    ShowSettings,
    /// 설정 창 닫힘
    HideSettings,
    /// 종료
    Quit,
    Other(String),
}

impl InstanceCommand {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "show-settings" | "show_settings" | "settings" => InstanceCommand::ShowSettings,
            "hide-settings" | "hide_settings" => InstanceCommand::HideSettings,
            "quit" | "exit" => InstanceCommand::Quit,
            other => InstanceCommand::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstanceCommand::ShowSettings => "show-settings",
            InstanceCommand::HideSettings => "hide-settings",
            InstanceCommand::Quit => "quit",
            InstanceCommand::Other(s) => s,
        }
    }
}

impl fmt::Display for InstanceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::{send_command, IpcServer};

#[cfg(not(unix))]
pub async fn send_command(_path: &Path, _command: &str) -> Result<(), IpcError> {
    Err(IpcError::Unsupported)
}
