//! `logharbor parse` command handler
//!
//! Runs the same normalizer and dispatcher the collector uses, without
//! binding a listener or touching the store.

use std::io::Write;

use chrono::Utc;
use serde::Serialize;

use logharbor_core::types::{FormatType, LogRecord};
use logharbor_log_pipeline::FormatDispatcher;
use logharbor_log_pipeline::encoding::normalize;

use crate::cli::ParseArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `parse` command.
pub fn execute(args: ParseArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let report = parse(args.message.as_bytes(), &args.peer);
    writer.render(&report)?;
    Ok(())
}

/// Normalize and classify one message as if it came from `peer`.
pub fn parse(payload: &[u8], peer: &str) -> ParseReport {
    let text = normalize(payload);
    let candidates = FormatDispatcher::candidates(&text).to_vec();
    let record = FormatDispatcher::new().dispatch(&text, peer, &Utc::now().to_rfc3339());
    ParseReport { candidates, record }
}

/// Parse result with the formats that were tried.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    /// Formats tried, in order.
    pub candidates: Vec<FormatType>,
    pub record: LogRecord,
}

impl Render for ParseReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let record = &self.record;
        let tried: Vec<&str> = self.candidates.iter().map(FormatType::as_str).collect();

        writeln!(w, "Format:     {}", record.format_type.as_str().bold())?;
        writeln!(w, "Tried:      {}", tried.join(", "))?;
        writeln!(w, "Timestamp:  {}", record.timestamp)?;
        writeln!(w, "Host:       {}", record.host)?;
        writeln!(w, "Message:    {}", record.message)?;
        for (label, value) in [
            ("Severity:", &record.severity),
            ("User:", &record.user),
            ("Device:", &record.device),
            ("Message ID:", &record.message_id),
        ] {
            if let Some(value) = value {
                writeln!(w, "{label:<11} {value}")?;
            }
        }
        writeln!(w, "Raw:        {}", record.raw.dimmed())?;
        Ok(())
    }
}
