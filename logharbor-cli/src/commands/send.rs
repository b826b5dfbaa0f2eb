//! `logharbor send` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

use logharbor_core::config::LogharborConfig;

use crate::cli::{SendArgs, SendTransport};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `send` command.
///
/// Without `--target`, the port comes from the configuration file and the
/// message goes to loopback.
pub async fn execute(
    args: SendArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let target = match args.target {
        Some(target) => target,
        None => {
            let config = LogharborConfig::load(config_path).await?;
            let port = match args.transport {
                SendTransport::Udp => config.listener.udp_port,
                SendTransport::Tcp => config.listener.tcp_port,
            };
            format!("127.0.0.1:{port}")
        }
    };

    let report = send(args.transport, &target, args.message.as_bytes()).await?;
    writer.render(&report)?;
    Ok(())
}

/// Send `payload` to `target` as one datagram or one TCP connection.
pub async fn send(
    transport: SendTransport,
    target: &str,
    payload: &[u8],
) -> Result<SendReport, CliError> {
    debug!(?transport, target, len = payload.len(), "sending test message");

    let bytes = match transport {
        SendTransport::Udp => {
            let bind = if target.starts_with('[') { "[::]:0" } else { "0.0.0.0:0" };
            let socket = UdpSocket::bind(bind)
                .await
                .map_err(|e| CliError::Send(format!("failed to bind udp socket: {e}")))?;
            socket
                .send_to(payload, target)
                .await
                .map_err(|e| CliError::Send(format!("{target}: {e}")))?
        }
        SendTransport::Tcp => {
            let mut stream = TcpStream::connect(target)
                .await
                .map_err(|e| CliError::Send(format!("{target}: {e}")))?;
            stream
                .write_all(payload)
                .await
                .map_err(|e| CliError::Send(format!("{target}: {e}")))?;
            stream
                .shutdown()
                .await
                .map_err(|e| CliError::Send(format!("{target}: {e}")))?;
            payload.len()
        }
    };

    Ok(SendReport {
        transport: match transport {
            SendTransport::Udp => "udp",
            SendTransport::Tcp => "tcp",
        },
        target: target.to_owned(),
        bytes,
    })
}

/// Result of a `send`.
#[derive(Debug, Serialize)]
pub struct SendReport {
    pub transport: &'static str,
    pub target: String,
    pub bytes: usize,
}

impl Render for SendReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "{} sent {} bytes to {} over {}",
            "✓".green(),
            self.bytes,
            self.target.bold(),
            self.transport
        )
    }
}
