//! Invalid configuration -> orchestrator build fails before binding.

use crate::helpers::config::*;

use logharbor_daemon::orchestrator::Orchestrator;

#[tokio::test]
async fn test_e2e_malformed_toml_fails() {
    let (_file, path) = write_raw_config("[listener\nudp_port = 1514");

    let err = Orchestrator::build(&path)
        .await
        .err()
        .expect("malformed TOML should fail");
    assert!(err.to_string().contains("failed to load config"), "got: {err}");
}

#[tokio::test]
async fn test_e2e_invalid_value_fails() {
    let (_file, path) = write_raw_config("[store]\nmax_logs = 0\n");

    let err = Orchestrator::build(&path)
        .await
        .err()
        .expect("zero retention cap should fail");
    assert!(err.to_string().contains("max_logs"), "got: {err}");
}

#[test]
fn test_e2e_build_from_invalid_config_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut builder = TestConfigBuilder::new(dir.path());
    builder.config_mut().listener.bind_addr = "localhost".to_owned();

    let err = Orchestrator::build_from_config(builder.build())
        .err()
        .expect("non-IP bind address should fail");
    assert!(err.to_string().contains("bind_addr"), "got: {err}");
}
