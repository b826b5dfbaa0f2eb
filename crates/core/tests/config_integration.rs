//! logharbor.toml 통합 설정 테스트
//!
//! - logharbor.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 파일 로딩 + 환경변수 우선순위 테스트

use std::io::Write;

use logharbor_core::config::LogharborConfig;
use logharbor_core::error::{ConfigError, LogharborError};
use serial_test::serial;

// =============================================================================
// logharbor.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_and_validates() {
    let content = include_str!("../../../logharbor.toml.example");
    let config = LogharborConfig::parse(content).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let content = include_str!("../../../logharbor.toml.example");
    let from_file = LogharborConfig::parse(content).expect("should parse");
    let from_code = LogharborConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);
    assert_eq!(from_file.general.data_dir, from_code.general.data_dir);
    assert_eq!(from_file.general.pid_file, from_code.general.pid_file);

    assert_eq!(from_file.listener.bind_addr, from_code.listener.bind_addr);
    assert_eq!(from_file.listener.udp_port, from_code.listener.udp_port);
    assert_eq!(from_file.listener.tcp_port, from_code.listener.tcp_port);
    assert_eq!(
        from_file.listener.max_message_size,
        from_code.listener.max_message_size
    );
    assert_eq!(from_file.listener.tcp_backlog, from_code.listener.tcp_backlog);
    assert_eq!(
        from_file.listener.max_connections,
        from_code.listener.max_connections
    );
    assert_eq!(
        from_file.listener.read_timeout_secs,
        from_code.listener.read_timeout_secs
    );

    assert_eq!(from_file.store.database_url, from_code.store.database_url);
    assert_eq!(from_file.store.max_logs, from_code.store.max_logs);
    assert_eq!(from_file.store.queue_capacity, from_code.store.queue_capacity);

    assert_eq!(
        from_file.live.flush_interval_ms,
        from_code.live.flush_interval_ms
    );
    assert_eq!(
        from_file.live.channel_capacity,
        from_code.live.channel_capacity
    );

    assert_eq!(from_file.metrics.enabled, from_code.metrics.enabled);
    assert_eq!(from_file.metrics.port, from_code.metrics.port);
    assert_eq!(from_file.metrics.endpoint, from_code.metrics.endpoint);
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_listener_only() {
    let toml = r#"
[listener]
bind_addr = "127.0.0.1"
udp_port = 5514
"#;
    let config = LogharborConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.listener.bind_addr, "127.0.0.1");
    assert_eq!(config.listener.udp_port, 5514);
    // 나머지는 기본값
    assert_eq!(config.listener.tcp_port, 1514);
    assert_eq!(config.store.max_logs, 1000);
    assert_eq!(config.general.log_level, "info");
}

#[test]
fn unknown_type_in_section_is_rejected() {
    let toml = r#"
[store]
max_logs = "many"
"#;
    let err = LogharborConfig::parse(toml).unwrap_err();
    assert!(matches!(
        err,
        LogharborError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
#[serial]
async fn load_applies_env_overrides_over_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[store]\nmax_logs = 200\n\n[live]\nflush_interval_ms = 250").unwrap();

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("LOGHARBOR_STORE_MAX_LOGS", "300") };
    let config = LogharborConfig::load(file.path()).await;
    unsafe { std::env::remove_var("LOGHARBOR_STORE_MAX_LOGS") };

    let config = config.expect("should load");
    assert_eq!(config.store.max_logs, 300);
    assert_eq!(config.live.flush_interval_ms, 250);
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_values_after_overrides() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[general]\nlog_level = \"info\"").unwrap();

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("LOGHARBOR_GENERAL_LOG_FORMAT", "xml") };
    let result = LogharborConfig::load(file.path()).await;
    unsafe { std::env::remove_var("LOGHARBOR_GENERAL_LOG_FORMAT") };

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        LogharborError::Config(ConfigError::InvalidValue { .. })
    ));
    assert!(err.to_string().contains("log_format"));
}

#[tokio::test]
async fn empty_file_yields_defaults() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = LogharborConfig::from_file(file.path())
        .await
        .expect("empty file should parse");
    assert_eq!(config.listener.udp_port, 1514);
}
