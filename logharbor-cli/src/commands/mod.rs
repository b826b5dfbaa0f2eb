//! Command handlers -- one module per subcommand

pub mod config;
pub mod logs;
pub mod parse;
pub mod send;
