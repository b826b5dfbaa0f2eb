//! Module registry and initialization.
//!
//! Each long-running component is wrapped as a [`ModuleHandle`] that
//! provides uniform lifecycle management via the [`DynPipeline`] trait.
//!
//! The [`ModuleRegistry`] tracks all registered modules and supports
//! ordered start/stop operations and health collection.

pub mod log_pipeline;

use logharbor_core::pipeline::{DynPipeline, HealthStatus};

use crate::health::ModuleHealth;

/// A handle to a registered module.
///
/// Wraps a `Box<dyn DynPipeline>` with metadata (name, enabled flag).
pub struct ModuleHandle {
    /// Module name for logging and health reporting.
    pub name: String,
    /// Whether this module is enabled in configuration.
    pub enabled: bool,
    /// The module's pipeline implementation (start/stop/health_check).
    pub pipeline: Box<dyn DynPipeline>,
    /// Set once `start()` succeeded, cleared by `stop()`.
    started: bool,
}

impl ModuleHandle {
    /// Create a new module handle.
    pub fn new(name: impl Into<String>, enabled: bool, pipeline: Box<dyn DynPipeline>) -> Self {
        Self {
            name: name.into(),
            enabled,
            pipeline,
            started: false,
        }
    }

    /// Whether the module is currently started.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Check the module's health status.
    ///
    /// Disabled modules always report `Healthy` (they are not expected to run).
    pub async fn health_check(&self) -> HealthStatus {
        if !self.enabled {
            return HealthStatus::Healthy;
        }
        self.pipeline.health_check().await
    }
}

/// Registry of all daemon modules.
///
/// Provides ordered start/stop and health check aggregation.
#[derive(Default)]
pub struct ModuleRegistry {
    /// Modules in registration order.
    modules: Vec<ModuleHandle>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module.
    pub fn register(&mut self, handle: ModuleHandle) {
        self.modules.push(handle);
    }

    /// Start all enabled modules in registration order.
    ///
    /// Returns an error on the first module that fails to start.
    /// Modules started before the failure stay running; the caller
    /// rolls them back with `stop_all`.
    pub async fn start_all(&mut self) -> anyhow::Result<()> {
        for handle in &mut self.modules {
            if !handle.enabled {
                tracing::debug!(module = %handle.name, "skipping disabled module");
                continue;
            }

            tracing::info!(module = %handle.name, "starting module");
            handle
                .pipeline
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start module '{}': {}", handle.name, e))?;
            handle.started = true;
            tracing::info!(module = %handle.name, "module started successfully");
        }
        Ok(())
    }

    /// Stop all started modules in reverse registration order.
    ///
    /// Logs errors but continues stopping remaining modules.
    pub async fn stop_all(&mut self) -> anyhow::Result<()> {
        let mut errors = Vec::new();

        for handle in self.modules.iter_mut().rev() {
            if !handle.started {
                continue;
            }

            tracing::info!(module = %handle.name, "stopping module");
            handle.started = false;
            if let Err(e) = handle.pipeline.stop().await {
                tracing::error!(
                    module = %handle.name,
                    error = %e,
                    "failed to stop module"
                );
                errors.push(format!("{}: {}", handle.name, e));
            } else {
                tracing::info!(module = %handle.name, "module stopped successfully");
            }
        }

        if !errors.is_empty() {
            return Err(anyhow::anyhow!(
                "errors stopping modules: {}",
                errors.join("; ")
            ));
        }

        Ok(())
    }

    /// Collect the health of every registered module.
    pub async fn health_statuses(&self) -> Vec<ModuleHealth> {
        let mut statuses = Vec::with_capacity(self.modules.len());
        for handle in &self.modules {
            statuses.push(ModuleHealth {
                name: handle.name.clone(),
                enabled: handle.enabled,
                status: handle.health_check().await,
            });
        }
        statuses
    }

    /// Number of registered modules.
    pub fn count(&self) -> usize {
        self.modules.len()
    }

    /// Number of enabled modules.
    pub fn enabled_count(&self) -> usize {
        self.modules.iter().filter(|m| m.enabled).count()
    }
}
