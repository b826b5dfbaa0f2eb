//! `logharbor logs` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use logharbor_core::config::LogharborConfig;
use logharbor_core::types::{FormatType, StoredRecord};
use logharbor_log_pipeline::RecordStore;

use crate::cli::LogsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `logs` command.
pub async fn execute(
    args: LogsArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = LogharborConfig::load(config_path).await?;
    let limit = args.limit.unwrap_or(config.store.max_logs);

    let report = query(&config.store.database_url, limit).await?;
    writer.render(&report)?;
    Ok(())
}

/// Read the newest `limit` records from the store at `database_url`.
///
/// The store is opened read-only: a missing database is an error, not a new file.
pub async fn query(database_url: &str, limit: u64) -> Result<LogsReport, CliError> {
    debug!(limit, "querying record store");

    let store = RecordStore::open_read_only(database_url).await?;
    let total = store.count().await?;
    let records = store.recent(limit).await?;
    store.close().await?;

    Ok(LogsReport { total, records })
}

/// Query result, newest record first.
#[derive(Debug, Serialize)]
pub struct LogsReport {
    /// Number of rows currently stored.
    pub total: u64,
    pub records: Vec<StoredRecord>,
}

impl Render for LogsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.records.is_empty() {
            writeln!(w, "No records stored.")?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<8} {:<14} {:<26} {:<20} {}",
            "ID".bold(),
            "FORMAT".bold(),
            "TIMESTAMP".bold(),
            "HOST".bold(),
            "MESSAGE".bold()
        )?;

        for stored in &self.records {
            let record = &stored.record;
            let format = format!("{:<14}", record.format_type.as_str());
            let format = match record.format_type {
                FormatType::Unknown => format.yellow(),
                FormatType::Cef | FormatType::Leef => format.cyan(),
                FormatType::SyslogRfc5424 | FormatType::SyslogBsd => format.green(),
            };
            writeln!(
                w,
                "{:<8} {} {:<26} {:<20} {}",
                stored.id, format, record.timestamp, record.host, record.message
            )?;
        }

        writeln!(w)?;
        writeln!(
            w,
            "showing {} of {} stored records",
            self.records.len(),
            self.total
        )?;
        Ok(())
    }
}
