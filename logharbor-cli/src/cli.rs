//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// logharbor -- network log collector.
///
/// Use `logharbor <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logharbor", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logharbor.toml configuration file.
    #[arg(short, long, default_value = "logharbor.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the newest stored records.
    Logs(LogsArgs),

    /// Send a test message to a running collector.
    Send(SendArgs),

    /// Classify and parse a message offline.
    Parse(ParseArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- logs ----

/// Query the record store, newest first.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Maximum number of records (default: the configured retention cap).
    #[arg(short = 'n', long)]
    pub limit: Option<u64>,
}

// ---- send ----

/// Transport used by `send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SendTransport {
    Udp,
    Tcp,
}

/// Send one message over UDP or TCP.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Transport to use.
    #[arg(long, default_value = "udp")]
    pub transport: SendTransport,

    /// Target `host:port` (default: loopback on the configured port).
    #[arg(long)]
    pub target: Option<String>,

    /// Message text, sent as-is.
    pub message: String,
}

// ---- parse ----

/// Run the normalizer and format dispatcher without a listener.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Address used as the fallback host.
    #[arg(long, default_value = "127.0.0.1")]
    pub peer: String,

    /// Message text to parse.
    pub message: String,
}

// ---- config ----

/// Manage logharbor configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only one section (general, listener, store, live, metrics).
        section: Option<String>,
    },
}
