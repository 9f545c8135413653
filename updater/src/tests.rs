//! 업데이터 시나리오 테스트
//!
//! ## 테스트 시나리오
//! 1. 버전 비교: 릴리스 태그 형식별 순서
//! 2. 설정: 비활성화, 기본값
//! 3. 에러 처리: 연결 불가 서버에 대한 체크

use crate::{
    checker, checker_from_config, is_newer, UpdateConfig, UpdaterError,
};

/// 연결이 거부되는 주소를 가리키는 설정
fn unreachable_config() -> UpdateConfig {
    UpdateConfig {
        api_base_url: Some("http://127.0.0.1:1".to_string()),
        timeout_secs: 2,
        proxy_fallback: false,
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════
// 테스트 1: 버전 비교
// ═══════════════════════════════════════════════════════

#[test]
fn test_release_tag_ordering_table() {
    let cases = [
        ("1.2.0", "1.1.9", true),
        ("1.2", "1.2.0", false),
        ("2.0.0-rc.1", "2.0.0-dev.5", true),
        ("2.0.0", "2.0.0-rc.1", true),
        ("1.0.0-dev.2", "1.0.0-dev.1", true),
        ("v3.1", "3.1.0", false),
        ("", "1.0.0", false),
        ("abc", "1.0.0", false),
        ("1.0.0+build5", "1.0.0", false),
        ("0.1.10", "0.1.9", true),
        ("1.0.0-rc.1", "1.0.0", false),
    ];
    for (latest, current, expected) in cases {
        assert_eq!(
            is_newer(latest, current),
            expected,
            "is_newer({:?}, {:?})",
            latest,
            current
        );
    }
}

#[test]
fn test_chained_prerelease_progression() {
    let progression = ["0.9", "1.0.0.dev1", "1.0.0.dev2", "1.0.0rc1", "1.0.0rc2", "1.0.0", "1.0.1"];
    for pair in progression.windows(2) {
        assert!(is_newer(pair[1], pair[0]), "{} should be newer than {}", pair[1], pair[0]);
        assert!(!is_newer(pair[0], pair[1]));
    }
}

// ═══════════════════════════════════════════════════════
// 테스트 2: 설정
// ═══════════════════════════════════════════════════════

#[test]
fn test_default_config_points_at_upstream() {
    let cfg = UpdateConfig::default();
    assert!(cfg.enabled);
    assert_eq!(cfg.github_repo, "PasteMD");
    assert_eq!(cfg.timeout_secs, 5);
    assert!(cfg.proxy_fallback);
}

#[test]
fn test_disabled_updater_refuses_checker() {
    let cfg = UpdateConfig {
        enabled: false,
        ..Default::default()
    };
    let err = checker_from_config(&cfg, "0.1.0").err().unwrap();
    assert!(matches!(err, UpdaterError::ConfigError { .. }));
}

// ═══════════════════════════════════════════════════════
// 테스트 3: 에러 처리
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let checker = checker_from_config(&unreachable_config(), "0.1.0").unwrap();
    let result = checker.check_update().await;

    let err = result.as_ref().err().cloned().unwrap();
    assert!(
        matches!(err, UpdaterError::NetworkError { .. } | UpdaterError::Timeout { .. }),
        "unexpected error: {:?}",
        err
    );
    assert!(err.is_recoverable());
    assert_eq!(checker::exit_code(&result), 1);
}

#[tokio::test]
async fn test_check_or_none_swallows_errors() {
    let checker = checker_from_config(&unreachable_config(), "0.1.0").unwrap();
    assert!(checker.check_update_or_none().await.is_none());
}
