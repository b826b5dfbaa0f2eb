//! Module orchestration -- assembly, lifecycle management, and health reporting.
//!
//! The [`Orchestrator`] is the central coordinator of `logharbor-daemon`.
//! It validates configuration, builds the log pipeline module, manages
//! startup/shutdown, and runs the main loop until a shutdown signal arrives.
//!
//! # Background tasks
//!
//! - Live tap: logs every record published by the live feed at debug level
//! - Process gauges: uptime and resident memory, when metrics are enabled
//!
//! Both stop on the shutdown broadcast before modules are stopped.

use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use logharbor_core::config::LogharborConfig;
use logharbor_core::metrics as m;
use logharbor_core::pipeline::HealthStatus;
use logharbor_core::types::LogRecord;

use crate::health::{DaemonHealth, ProcessProbe, aggregate_status};
use crate::metrics_server;
use crate::modules::{ModuleRegistry, log_pipeline};

/// Interval between periodic health log lines.
const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(60);
/// Interval between process gauge updates.
const GAUGE_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: LogharborConfig,
    /// Registry of all modules (ordered for start/stop).
    modules: ModuleRegistry,
    /// Shutdown broadcast sender (signals all background tasks).
    shutdown_tx: broadcast::Sender<()>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
    /// Live feed receiver, consumed by the live tap when the daemon runs.
    live_rx: Option<broadcast::Receiver<LogRecord>>,
    /// Memory sampler for health reports.
    probe: ProcessProbe,
}

impl Orchestrator {
    /// Load configuration and build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or validated,
    /// or if the pipeline cannot be built from it.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = LogharborConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {e}"))?;
        Self::build_from_config(config)
    }

    /// Build from an already-loaded configuration.
    pub fn build_from_config(config: LogharborConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {e}"))?;

        // Install metrics recorder before the pipeline records anything
        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
        }

        let mut modules = ModuleRegistry::new();
        let pipeline = log_pipeline::init(&config)?;
        modules.register(pipeline.handle);

        let (shutdown_tx, _) = broadcast::channel(16);

        tracing::info!(
            modules = modules.count(),
            udp_port = config.listener.udp_port,
            tcp_port = config.listener.tcp_port,
            "orchestrator initialized"
        );

        Ok(Self {
            config,
            modules,
            shutdown_tx,
            start_time: Instant::now(),
            live_rx: Some(pipeline.live_rx),
            probe: ProcessProbe::new(),
        })
    }

    /// Start all modules and block until SIGTERM or SIGINT.
    pub async fn run(&mut self) -> Result<()> {
        let signal = shutdown_signal()?;
        self.run_until(signal).await
    }

    /// Start all modules and block until `shutdown` resolves.
    ///
    /// The future's output names the trigger in the shutdown log line.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = &'static str>,
    {
        let pid_file = self.config.general.pid_file.clone();
        let pid_path = (!pid_file.is_empty()).then(|| Path::new(&pid_file));

        ensure_data_dir(&self.config.general.data_dir)?;
        if let Some(path) = pid_path {
            write_pid_file(path)?;
        }

        tracing::info!("starting all modules");
        if let Err(e) = self.modules.start_all().await {
            tracing::warn!("startup failed, rolling back already-started modules");
            if let Err(stop_err) = self.modules.stop_all().await {
                tracing::error!(
                    startup_error = %e,
                    rollback_error = %stop_err,
                    "rollback also failed during startup failure cleanup"
                );
            }
            if let Some(path) = pid_path {
                remove_pid_file(path);
            }
            return Err(e);
        }
        self.start_time = Instant::now();

        let mut tasks = Vec::new();
        if let Some(live_rx) = self.live_rx.take() {
            if tracing::enabled!(tracing::Level::DEBUG) {
                tasks.push(spawn_live_tap(live_rx, self.shutdown_tx.subscribe()));
            }
        }
        if self.config.metrics.enabled {
            tasks.push(spawn_process_gauges(
                self.start_time,
                self.shutdown_tx.subscribe(),
            ));
        }

        // Main loop
        tracing::info!("logharbor daemon running");
        tokio::pin!(shutdown);
        let mut health_tick = tokio::time::interval(HEALTH_LOG_INTERVAL);
        health_tick.tick().await;

        loop {
            tokio::select! {
                trigger = &mut shutdown => {
                    tracing::info!(signal = trigger, "shutdown signal received");
                    break;
                }
                _ = health_tick.tick() => {
                    let health = self.health().await;
                    log_health(&health);
                }
            }
        }

        tracing::info!("broadcasting shutdown signal to background tasks");
        let _ = self.shutdown_tx.send(());
        for task in tasks {
            let _ = task.await;
        }

        tracing::info!("stopping all modules");
        let stopped = self.modules.stop_all().await;

        if let Some(path) = pid_path {
            remove_pid_file(path);
        }

        tracing::info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "logharbor daemon shut down"
        );
        stopped
    }

    /// Compute the current aggregated health report.
    pub async fn health(&mut self) -> DaemonHealth {
        let modules = self.modules.health_statuses().await;
        DaemonHealth {
            status: aggregate_status(&modules),
            uptime_secs: self.start_time.elapsed().as_secs(),
            memory_mb: self.probe.memory_mb(),
            modules,
        }
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &LogharborConfig {
        &self.config
    }
}

/// Install SIGTERM and SIGINT handlers.
///
/// The returned future resolves with the name of the first signal received.
fn shutdown_signal() -> Result<impl Future<Output = &'static str>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {e}"))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {e}"))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

fn log_health(health: &DaemonHealth) {
    match &health.status {
        HealthStatus::Healthy => tracing::info!(
            uptime_secs = health.uptime_secs,
            memory_mb = health.memory_mb,
            "daemon healthy"
        ),
        HealthStatus::Degraded(reason) => tracing::warn!(
            uptime_secs = health.uptime_secs,
            memory_mb = health.memory_mb,
            reason = %reason,
            "daemon degraded"
        ),
        HealthStatus::Unhealthy(reason) => tracing::error!(
            uptime_secs = health.uptime_secs,
            memory_mb = health.memory_mb,
            reason = %reason,
            "daemon unhealthy"
        ),
    }
}

/// Create the data directory if it is configured and missing.
fn ensure_data_dir(data_dir: &str) -> Result<()> {
    if data_dir.is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("failed to create data directory {data_dir}: {e}"))
}

/// Write the current process PID to a file.
///
/// Used to prevent duplicate daemon instances.
///
/// # Security
///
/// - Uses `create_new(true)` to atomically create the file
/// - Verifies the created file is a regular file
/// - Creates the parent directory with mode 0o700
fn write_pid_file(path: &Path) -> Result<()> {
    use std::fs::{self, OpenOptions};
    use std::io::{ErrorKind, Write};

    if let Some(parent) = path.parent() {
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            fs::DirBuilder::new()
                .mode(0o700)
                .recursive(true)
                .create(parent)?;
        }
        #[cfg(not(unix))]
        {
            fs::create_dir_all(parent)?;
        }
    }

    let pid = std::process::id();

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let existing_pid = fs::read_to_string(path).unwrap_or_else(|_| "unknown".to_owned());
            return Err(anyhow::anyhow!(
                "PID file {} already exists with PID: {}. Is another instance running?",
                path.display(),
                existing_pid.trim()
            ));
        }
        Err(e) => return Err(e.into()),
    };

    if !file.metadata()?.is_file() {
        let _ = fs::remove_file(path);
        return Err(anyhow::anyhow!(
            "PID file {} is not a regular file",
            path.display()
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    writeln!(file, "{pid}")?;

    tracing::info!(pid, path = %path.display(), "PID file written");
    Ok(())
}

/// Remove the PID file on daemon shutdown.
///
/// Logs a warning but does not fail if the file cannot be removed.
fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove PID file");
    } else {
        tracing::info!(path = %path.display(), "PID file removed");
    }
}

/// Spawn a task that logs every live-feed record at debug level.
fn spawn_live_tap(
    mut live_rx: broadcast::Receiver<LogRecord>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                received = live_rx.recv() => {
                    match received {
                        Ok(record) => {
                            tracing::debug!(
                                format = %record.format_type,
                                host = %record.host,
                                timestamp = %record.timestamp,
                                message = %record.message,
                                "live record"
                            );
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "live tap lagged behind the feed");
                        }
                        Err(RecvError::Closed) => {
                            tracing::debug!("live feed closed, exiting tap");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("live tap shutting down");
                    break;
                }
            }
        }
    })
}

/// Spawn a task that periodically updates the uptime and memory gauges.
fn spawn_process_gauges(
    start_time: Instant,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut probe = ProcessProbe::new();
        let mut interval = tokio::time::interval(GAUGE_UPDATE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::UPTIME_SECONDS).set(start_time.elapsed().as_secs() as f64);
                    if let Some(bytes) = probe.memory_bytes() {
                        #[allow(clippy::cast_precision_loss)]
                        metrics::gauge!(m::PROCESS_MEMORY_BYTES).set(bytes as f64);
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("process gauge updater shutting down");
                    break;
                }
            }
        }
    })
}
