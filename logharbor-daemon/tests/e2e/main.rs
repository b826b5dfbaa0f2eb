//! E2E integration tests for logharbor-daemon.
//!
//! These tests run the real orchestrator against loopback sockets and a
//! temporary SQLite database, then observe the results through the store.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (config builder, running daemon, assertions)
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p logharbor-daemon --test e2e
//! ```

mod helpers;
mod scenarios;
