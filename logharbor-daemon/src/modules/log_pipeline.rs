//! Log pipeline module initialization.
//!
//! Converts the `[listener]`, `[store]` and `[live]` sections of
//! `LogharborConfig` into a `PipelineConfig`, builds the `LogPipeline`
//! and wraps it in a `ModuleHandle`.
//!
//! A live-feed receiver is taken before the pipeline is boxed so the
//! orchestrator can tap flushed records without reaching into the module.

use anyhow::Result;
use tokio::sync::broadcast;

use logharbor_core::config::LogharborConfig;
use logharbor_core::types::LogRecord;
use logharbor_log_pipeline::{LogPipelineBuilder, PipelineConfig};

use super::ModuleHandle;

/// Module name used in logs and health reports.
pub const MODULE_NAME: &str = "log-pipeline";

/// An initialized, not yet started, log pipeline module.
pub struct LogPipelineModule {
    pub handle: ModuleHandle,
    /// Receives every record published by the live flusher.
    pub live_rx: broadcast::Receiver<LogRecord>,
}

/// Initialize the log pipeline module.
///
/// # Errors
///
/// Returns an error if the derived pipeline configuration is invalid.
pub fn init(config: &LogharborConfig) -> Result<LogPipelineModule> {
    tracing::info!("initializing log pipeline");

    let pipeline_config = PipelineConfig::from_core(config);
    let pipeline = LogPipelineBuilder::new()
        .config(pipeline_config)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build log pipeline: {e}"))?;

    let live_rx = pipeline.subscribe();
    let handle = ModuleHandle::new(MODULE_NAME, true, Box::new(pipeline));

    Ok(LogPipelineModule { handle, live_rx })
}
