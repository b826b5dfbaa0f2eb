//! Startup faults: the daemon fails cleanly and leaves no state behind.

use crate::helpers::config::*;

use logharbor_daemon::orchestrator::Orchestrator;

/// An occupied TCP port fails startup, and the PID file is cleaned up.
#[tokio::test]
async fn test_e2e_port_in_use_fails_startup() {
    let dir = tempfile::tempdir().expect("temp dir");
    let pid_path = dir.path().join("logharbor.pid");
    let config = TestConfigBuilder::new(dir.path())
        .pid_file(&pid_path)
        .build();
    let _occupied = std::net::TcpListener::bind(("127.0.0.1", config.listener.tcp_port))
        .expect("should occupy tcp port");

    let mut orchestrator = Orchestrator::build_from_config(config).expect("should build");
    let result = orchestrator.run_until(std::future::pending()).await;

    let err = result.expect_err("startup should fail when the port is taken");
    assert!(err.to_string().contains("log-pipeline"), "got: {err}");
    assert!(!pid_path.exists(), "PID file should be removed after failed startup");
}

/// A stale PID file blocks startup before any socket is bound.
#[tokio::test]
async fn test_e2e_existing_pid_file_blocks_startup() {
    let dir = tempfile::tempdir().expect("temp dir");
    let pid_path = dir.path().join("logharbor.pid");
    std::fs::write(&pid_path, "4242\n").expect("should write stale PID");
    let config = TestConfigBuilder::new(dir.path())
        .pid_file(&pid_path)
        .build();
    let port = config.listener.tcp_port;

    let mut orchestrator = Orchestrator::build_from_config(config).expect("should build");
    let err = orchestrator
        .run_until(std::future::pending())
        .await
        .expect_err("existing PID file should block startup");

    assert!(err.to_string().contains("4242"), "got: {err}");
    // Nothing was bound
    std::net::TcpListener::bind(("127.0.0.1", port)).expect("port should still be free");
    // The stale file is left for the operator
    assert!(pid_path.exists());
}

/// A connection that sends nothing does not produce a record or stop the listener.
#[tokio::test]
async fn test_e2e_empty_connection_is_ignored() {
    use crate::helpers::assertions::*;
    use crate::helpers::daemon::RunningDaemon;

    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();
    let url = config.store.database_url.clone();
    let daemon = RunningDaemon::start(config).await;

    // Readiness probes already opened empty connections
    assert_count_stays(&url, 0).await;

    daemon.send_tcp(b"after empty").await;
    let rows = wait_for_count(&url, 1).await;
    assert_eq!(rows[0].record.message, "after empty");

    let (_, result) = daemon.stop().await;
    result.expect("daemon should stop");
}
