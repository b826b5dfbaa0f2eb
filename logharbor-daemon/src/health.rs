//! Aggregated health check reporting.
//!
//! Combines each module's `health_check()` with process-level signals
//! (uptime and resident memory) into a single [`DaemonHealth`] report.
//! The overall daemon status is the worst status among all enabled modules.
//!
//! # Aggregation Rule
//!
//! - All Healthy -> Healthy
//! - Any Degraded, none Unhealthy -> Degraded(reason)
//! - Any Unhealthy -> Unhealthy(reason)

use serde::Serialize;
use sysinfo::{Pid, System};

use logharbor_core::pipeline::HealthStatus;

/// Aggregated health report for the entire daemon.
#[derive(Debug, Clone, Serialize)]
pub struct DaemonHealth {
    /// Overall daemon health status (worst of all modules).
    pub status: HealthStatus,
    /// Daemon uptime in seconds since start.
    pub uptime_secs: u64,
    /// Resident memory of the daemon process in MiB, when it can be sampled.
    pub memory_mb: Option<f64>,
    /// Per-module health reports.
    pub modules: Vec<ModuleHealth>,
}

/// Health status for a single module.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleHealth {
    /// Module name (e.g., "log-pipeline").
    pub name: String,
    /// Whether the module is enabled in configuration.
    pub enabled: bool,
    /// Current health status of the module.
    pub status: HealthStatus,
}

/// Aggregate multiple module health statuses into a single status.
///
/// Returns the worst status found: Unhealthy > Degraded > Healthy.
/// Only considers enabled modules.
pub fn aggregate_status(modules: &[ModuleHealth]) -> HealthStatus {
    let mut unhealthy = Vec::new();
    let mut degraded = Vec::new();

    for module in modules.iter().filter(|m| m.enabled) {
        match &module.status {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                degraded.push(format!("{}: {}", module.name, reason));
            }
            HealthStatus::Unhealthy(reason) => {
                unhealthy.push(format!("{}: {}", module.name, reason));
            }
        }
    }

    if !unhealthy.is_empty() {
        unhealthy.extend(degraded);
        HealthStatus::Unhealthy(unhealthy.join("; "))
    } else if !degraded.is_empty() {
        HealthStatus::Degraded(degraded.join("; "))
    } else {
        HealthStatus::Healthy
    }
}

/// Samples resident memory of the current process.
pub struct ProcessProbe {
    system: System,
    pid: Option<Pid>,
}

impl ProcessProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = e, "cannot resolve own pid, memory reporting disabled");
                None
            }
        };
        Self {
            system: System::new(),
            pid,
        }
    }

    /// Current resident set size in bytes.
    pub fn memory_bytes(&mut self) -> Option<u64> {
        let pid = self.pid?;
        if !self.system.refresh_process(pid) {
            return None;
        }
        self.system.process(pid).map(|process| process.memory())
    }

    /// Current resident set size in MiB.
    pub fn memory_mb(&mut self) -> Option<f64> {
        #[allow(clippy::cast_precision_loss)]
        let mb = self
            .memory_bytes()
            .map(|bytes| bytes as f64 / (1024.0 * 1024.0));
        mb
    }
}

impl Default for ProcessProbe {
    fn default() -> Self {
        Self::new()
    }
}
