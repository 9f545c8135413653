pub mod config;
pub mod ipc;
pub mod ui_session;

pub use pastemd_updater_lib as updater;

/// 실행 중인 앱 버전
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
