//! Shared E2E test helpers.
//!
//! Provides reusable utilities for building test configurations,
//! running the daemon in the background, sending messages, and
//! polling the store.

pub mod assertions;
pub mod config;
pub mod daemon;
