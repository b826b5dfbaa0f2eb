//! E2E test scenarios.

mod config_error;
mod fault_isolation;
mod lifecycle;
mod pipeline_flow;
mod shutdown;
