//! 설정 파일 관리
//!
//! `config/pastemd.toml`에서 `[updater]`, `[ipc]` 섹션을 로드합니다.
//! 파일이 없으면 기본값을 사용합니다.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pastemd_updater_lib::UpdateConfig;

pub const CONFIG_FILE_NAME: &str = "pastemd.toml";

/// 전체 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub updater: UpdateConfig,
    pub ipc: IpcConfig,
}

/// 단일 인스턴스 IPC 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// 소켓 파일 이름 (`{app_name}.sock`)
    pub app_name: String,
    /// 소켓 디렉터리 (없으면 OS 임시 디렉터리)
    pub socket_dir: Option<String>,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            app_name: "PasteMD".to_string(),
            socket_dir: None,
        }
    }
}

impl IpcConfig {
    pub fn socket_path(&self) -> PathBuf {
        let dir = self
            .socket_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        crate::ipc::socket_path(&self.app_name, &dir)
    }
}

/// 설정 파일 경로 결정
pub fn config_file_path(override_path: Option<&Path>) -> PathBuf {
    // 0. 명시적 지정
    if let Some(p) = override_path {
        return p.to_path_buf();
    }

    // 1. 실행 파일 옆 config/pastemd.toml
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let cfg = dir.join("config").join(CONFIG_FILE_NAME);
            if cfg.exists() {
                return cfg;
            }
        }
    }

    // 2. 기본: CWD의 config/pastemd.toml (생성용)
    PathBuf::from("config").join(CONFIG_FILE_NAME)
}

impl AppConfig {
    /// TOML 파일에서 설정 로드 (없으면 기본값)
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("[Config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("[Config] Loaded from {}", path.display());
        Ok(cfg)
    }
}

const AVAILABLE_KEYS: &str = "updater.enabled, updater.github_owner, updater.github_repo, \
    updater.api_base_url, updater.timeout_secs, updater.proxy_fallback, ipc.app_name, ipc.socket_dir";

/// config set <key> <value>
///
/// 키는 `section.field` 형식입니다. 값 타입을 검증한 뒤 파일에 기록합니다.
pub fn set_config_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut table: toml::value::Table = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        content
            .parse::<toml::Value>()?
            .as_table()
            .cloned()
            .unwrap_or_default()
    } else {
        toml::value::Table::new()
    };

    let toml_val: toml::Value = match key {
        "updater.enabled" | "updater.proxy_fallback" => {
            toml::Value::Boolean(value.parse::<bool>().map_err(|_| {
                anyhow::anyhow!("Invalid boolean value: '{}' (use true/false)", value)
            })?)
        }
        "updater.timeout_secs" => {
            let secs = value
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Invalid integer value: '{}'", value))?;
            if secs <= 0 {
                anyhow::bail!("timeout_secs must be positive, got {}", secs);
            }
            toml::Value::Integer(secs)
        }
        "updater.github_owner" | "updater.github_repo" | "updater.api_base_url"
        | "ipc.app_name" | "ipc.socket_dir" => toml::Value::String(value.to_string()),
        _ => {
            anyhow::bail!("Unknown config key: '{}'\nAvailable: {}", key, AVAILABLE_KEYS);
        }
    };

    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| anyhow::anyhow!("Config key must be 'section.field': '{}'", key))?;

    if !table.contains_key(section) {
        table.insert(
            section.to_string(),
            toml::Value::Table(toml::value::Table::new()),
        );
    }
    match table.get_mut(section) {
        Some(toml::Value::Table(t)) => {
            t.insert(field.to_string(), toml_val);
        }
        _ => anyhow::bail!("[{}] in {} is not a table", section, path.display()),
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(&toml::Value::Table(table))?;
    std::fs::write(path, content)?;
    tracing::info!("[Config] {} = {} ({})", key, value, path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.ipc.app_name, "PasteMD");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[updater]\ntimeout_secs = 10\napi_base_url = \"http://127.0.0.1:9876\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.updater.timeout_secs, 10);
        assert_eq!(cfg.updater.api_base_url.as_deref(), Some("http://127.0.0.1:9876"));
        assert_eq!(cfg.updater.github_repo, "PasteMD");
        assert!(cfg.updater.proxy_fallback);
        assert_eq!(cfg.ipc, IpcConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[updater\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_set_config_value_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join(CONFIG_FILE_NAME);

        set_config_value(&path, "updater.proxy_fallback", "false").unwrap();
        set_config_value(&path, "updater.timeout_secs", "7").unwrap();
        set_config_value(&path, "ipc.socket_dir", "/tmp/pastemd").unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert!(!cfg.updater.proxy_fallback);
        assert_eq!(cfg.updater.timeout_secs, 7);
        assert_eq!(cfg.ipc.socket_dir.as_deref(), Some("/tmp/pastemd"));
        assert_eq!(
            cfg.ipc.socket_path(),
            PathBuf::from("/tmp/pastemd").join("PasteMD.sock")
        );
    }

    #[test]
    fn test_set_config_value_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        assert!(set_config_value(&path, "updater.enabled", "yes").is_err());
        assert!(set_config_value(&path, "updater.timeout_secs", "0").is_err());
        assert!(set_config_value(&path, "updater.unknown", "1").is_err());
        assert!(!path.exists());
    }
}
