//! Wire message -> daemon -> store, for every supported format.

use crate::helpers::assertions::*;
use crate::helpers::config::*;
use crate::helpers::daemon::RunningDaemon;

use logharbor_core::types::FormatType;

/// UDP CEF datagram is classified and stored with extension fields.
#[tokio::test]
async fn test_e2e_udp_cef_is_stored() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();
    let url = config.store.database_url.clone();
    let daemon = RunningDaemon::start(config).await;

    daemon
        .send_udp(b"CEF:0|Security|Firewall|1.0|100|Blocked|7|src=10.0.0.5 sev=7 usr=alice msg=blocked")
        .await;

    let rows = wait_for_count(&url, 1).await;
    let record = &rows[0].record;
    assert_eq!(record.format_type, FormatType::Cef);
    assert_eq!(record.host, "10.0.0.5");
    assert_eq!(record.message, "CEF Event: Blocked msg=blocked");
    assert_eq!(record.severity.as_deref(), Some("7"));
    assert_eq!(record.user.as_deref(), Some("alice"));

    let (_, result) = daemon.stop().await;
    result.expect("daemon should stop");
}

/// TCP RFC 5424 message keeps its timestamp and message id.
#[tokio::test]
async fn test_e2e_tcp_rfc5424_is_stored() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();
    let url = config.store.database_url.clone();
    let daemon = RunningDaemon::start(config).await;

    daemon
        .send_tcp(b"<165>1 2026-03-01T08:30:00Z web01 nginx 42 REQ7 - GET /health\n")
        .await;

    let rows = wait_for_count(&url, 1).await;
    let record = &rows[0].record;
    assert_eq!(record.format_type, FormatType::SyslogRfc5424);
    assert_eq!(record.timestamp, "2026-03-01T08:30:00+00:00");
    assert_eq!(record.host, "web01");
    assert_eq!(record.message, "GET /health");
    assert_eq!(record.message_id.as_deref(), Some("REQ7"));

    let (_, result) = daemon.stop().await;
    result.expect("daemon should stop");
}

/// Legacy single-byte payloads are decoded before parsing.
#[tokio::test]
async fn test_e2e_latin1_payload_is_decoded() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();
    let url = config.store.database_url.clone();
    let daemon = RunningDaemon::start(config).await;

    // "café" in ISO-8859-1
    daemon.send_tcp(b"caf\xe9 au lait").await;

    let rows = wait_for_count(&url, 1).await;
    let record = &rows[0].record;
    assert_eq!(record.format_type, FormatType::Unknown);
    assert!(record.raw.starts_with("caf"), "got: {}", record.raw);
    assert!(record.raw.ends_with("au lait"), "got: {}", record.raw);
    assert!(!record.raw.contains('\u{FFFD}'));
    assert_eq!(record.host, "127.0.0.1");

    let (_, result) = daemon.stop().await;
    result.expect("daemon should stop");
}

/// Retention cap from the daemon config is enforced after each insert.
#[tokio::test]
async fn test_e2e_retention_cap() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).max_logs(2).build();
    let url = config.store.database_url.clone();
    let daemon = RunningDaemon::start(config).await;

    for i in 1..=4 {
        daemon.send_tcp(format!("event {i}").as_bytes()).await;
        wait_for_rows(&url, DEFAULT_TIMEOUT, |rows| {
            rows.first().is_some_and(|r| r.record.message == format!("event {i}"))
        })
        .await;
    }

    let rows = wait_for_count(&url, 2).await;
    assert_eq!(rows[0].record.message, "event 4");
    assert_eq!(rows[1].record.message, "event 3");

    let (_, result) = daemon.stop().await;
    result.expect("daemon should stop");
}
