//! Graceful shutdown: bounded time, listeners released, data kept.

use std::time::Duration;

use crate::helpers::assertions::*;
use crate::helpers::config::*;
use crate::helpers::daemon::RunningDaemon;

/// Shutdown completes promptly even with an idle open connection.
#[tokio::test]
async fn test_e2e_shutdown_is_bounded() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).read_timeout_secs(30).build();
    let daemon = RunningDaemon::start(config).await;

    // Hold a connection open without sending
    let _idle = tokio::net::TcpStream::connect(daemon.addr)
        .await
        .expect("should connect");

    let stopped = tokio::time::timeout(Duration::from_secs(10), daemon.stop()).await;
    let (_, result) = stopped.expect("shutdown should finish within timeout");
    result.expect("daemon should stop cleanly");
}

/// After shutdown both ports can be bound again.
#[tokio::test]
async fn test_e2e_shutdown_releases_ports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();
    let port = config.listener.tcp_port;
    let daemon = RunningDaemon::start(config).await;

    let (_, result) = daemon.stop().await;
    result.expect("daemon should stop cleanly");

    std::net::UdpSocket::bind(("127.0.0.1", port)).expect("udp port should be released");
    std::net::TcpListener::bind(("127.0.0.1", port)).expect("tcp port should be released");
}

/// Records accepted before shutdown are all persisted.
#[tokio::test]
async fn test_e2e_shutdown_keeps_accepted_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();
    let url = config.store.database_url.clone();
    let daemon = RunningDaemon::start(config).await;

    for i in 0..5 {
        daemon.send_tcp(format!("batch {i}").as_bytes()).await;
    }
    wait_for_count(&url, 5).await;

    let (_, result) = daemon.stop().await;
    result.expect("daemon should stop cleanly");
    assert_count_stays(&url, 5).await;
}
