//! Test configuration builder for E2E tests.
//!
//! Provides [`TestConfigBuilder`] for creating `LogharborConfig` instances
//! that bind to free loopback ports and keep all state in a temp directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use logharbor_core::config::LogharborConfig;

/// A port number free for both TCP and UDP on loopback.
pub fn free_port() -> u16 {
    loop {
        let tcp = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind probe tcp");
        let port = tcp.local_addr().expect("probe has no addr").port();
        if std::net::UdpSocket::bind(("127.0.0.1", port)).is_ok() {
            return port;
        }
    }
}

/// SQLite URL for a database file inside `dir`.
pub fn database_url(dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", dir.join("logs.db").display())
}

/// Builder for constructing test-friendly `LogharborConfig` instances.
///
/// By default: loopback bind on a free port, database and data directory
/// inside `dir`, no PID file, metrics disabled, fast live flush.
///
/// # Example
///
/// ```ignore
/// let dir = tempfile::tempdir().unwrap();
/// let config = TestConfigBuilder::new(dir.path()).max_logs(5).build();
/// ```
#[allow(dead_code)]
pub struct TestConfigBuilder {
    config: LogharborConfig,
}

#[allow(dead_code)]
impl TestConfigBuilder {
    /// Create a new builder rooted at `dir`.
    pub fn new(dir: &Path) -> Self {
        let port = free_port();
        let mut config = LogharborConfig::default();

        config.general.pid_file = String::new();
        config.general.data_dir = dir.join("data").display().to_string();
        config.listener.bind_addr = "127.0.0.1".to_owned();
        config.listener.udp_port = port;
        config.listener.tcp_port = port;
        config.store.database_url = database_url(dir);
        config.live.flush_interval_ms = 50;
        config.metrics.enabled = false;

        Self { config }
    }

    /// Set the log level.
    pub fn log_level(mut self, level: &str) -> Self {
        self.config.general.log_level = level.to_owned();
        self
    }

    /// Set the PID file path.
    pub fn pid_file(mut self, path: &Path) -> Self {
        self.config.general.pid_file = path.display().to_string();
        self
    }

    /// Set the retention cap.
    pub fn max_logs(mut self, max_logs: u64) -> Self {
        self.config.store.max_logs = max_logs;
        self
    }

    /// Set the TCP read timeout.
    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.config.listener.read_timeout_secs = secs;
        self
    }

    /// Get mutable access to the underlying config for advanced customization.
    pub fn config_mut(&mut self) -> &mut LogharborConfig {
        &mut self.config
    }

    /// Build and return the `LogharborConfig` without validating it.
    pub fn build(self) -> LogharborConfig {
        self.config
    }
}

/// Write a `LogharborConfig` to a temporary TOML file and return its path.
///
/// The caller must keep the returned `NamedTempFile` alive for the duration of the test.
#[allow(dead_code)]
pub fn write_config_to_tempfile(config: &LogharborConfig) -> (tempfile::NamedTempFile, PathBuf) {
    let toml_str = toml::to_string_pretty(config).expect("failed to serialize config to TOML");
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(toml_str.as_bytes())
        .expect("failed to write config to temp file");
    file.flush().expect("failed to flush temp file");
    let path = file.path().to_path_buf();
    (file, path)
}

/// Write raw TOML text to a temporary file.
#[allow(dead_code)]
pub fn write_raw_config(contents: &str) -> (tempfile::NamedTempFile, PathBuf) {
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write config to temp file");
    let path = file.path().to_path_buf();
    (file, path)
}
