//! logharbor operator CLI.
//!
//! Query the record store, send test messages to a running collector,
//! parse messages offline, and inspect configuration.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
