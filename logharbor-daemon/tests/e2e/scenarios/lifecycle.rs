//! Configuration file -> orchestrator build -> run -> shutdown.
//!
//! Validates the daemon lifecycle against real listeners: PID file
//! handling, health transitions, and restart on the same database.

use crate::helpers::assertions::*;
use crate::helpers::config::*;
use crate::helpers::daemon::RunningDaemon;

use logharbor_core::config::LogharborConfig;
use logharbor_daemon::orchestrator::Orchestrator;

/// A config written to disk and read back builds an orchestrator.
#[tokio::test]
async fn test_e2e_config_file_round_trip_builds() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).max_logs(7).build();
    let (_file, path) = write_config_to_tempfile(&config);

    let orchestrator = Orchestrator::build(&path)
        .await
        .expect("orchestrator should build from file");

    assert_eq!(orchestrator.config().store.max_logs, 7);
    assert_eq!(
        orchestrator.config().listener.udp_port,
        config.listener.udp_port
    );
}

/// PID file exists while running and is removed on shutdown.
#[tokio::test]
async fn test_e2e_pid_file_lifecycle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let pid_path = dir.path().join("run").join("logharbor.pid");
    let config = TestConfigBuilder::new(dir.path())
        .pid_file(&pid_path)
        .build();

    let daemon = RunningDaemon::start(config).await;

    let content = std::fs::read_to_string(&pid_path).expect("PID file should exist while running");
    assert_eq!(content.trim(), std::process::id().to_string());

    let (_, result) = daemon.stop().await;
    result.expect("daemon should shut down cleanly");
    assert!(!pid_path.exists(), "PID file should be removed on shutdown");
}

/// Running daemon reports healthy; stopped daemon reports unhealthy.
#[tokio::test]
async fn test_e2e_health_transitions() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();

    let daemon = RunningDaemon::start(config).await;
    let (mut orchestrator, result) = daemon.stop().await;
    result.expect("daemon should shut down cleanly");

    let health = orchestrator.health().await;
    assert!(health.status.is_unhealthy());
    assert_eq!(health.modules.len(), 1);
    assert!(health.memory_mb.is_some());
}

/// Records stored by one run are still there after a restart.
#[tokio::test]
async fn test_e2e_restart_keeps_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = TestConfigBuilder::new(dir.path()).build();
    let url = config.store.database_url.clone();

    // First run stores one record
    let daemon = RunningDaemon::start(config.clone()).await;
    daemon.send_tcp(b"<34>Oct 11 22:14:15 host1 first run").await;
    wait_for_count(&url, 1).await;
    let (_, result) = daemon.stop().await;
    result.expect("first run should stop cleanly");

    // Second run on a fresh port but the same database
    let mut second: LogharborConfig = config;
    let port = free_port();
    second.listener.udp_port = port;
    second.listener.tcp_port = port;
    let daemon = RunningDaemon::start(second).await;
    daemon.send_tcp(b"<34>Oct 11 22:14:16 host1 second run").await;

    let rows = wait_for_count(&url, 2).await;
    assert_eq!(rows[0].id, 2);
    assert_eq!(rows[1].record.message, "first run");

    let (_, result) = daemon.stop().await;
    result.expect("second run should stop cleanly");
}
