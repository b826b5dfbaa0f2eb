//! Background daemon runner for E2E tests.
//!
//! Spawns `Orchestrator::run_until` on a task and stops it through a
//! oneshot channel, mirroring a SIGTERM without touching process signals.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use logharbor_core::config::LogharborConfig;
use logharbor_daemon::orchestrator::Orchestrator;

/// How long to wait for listeners to come up.
const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// A daemon running in a background task.
#[allow(dead_code)]
pub struct RunningDaemon {
    /// Address of both listeners.
    pub addr: SocketAddr,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<(Orchestrator, anyhow::Result<()>)>,
}

#[allow(dead_code)]
impl RunningDaemon {
    /// Build an orchestrator from `config`, start it, and wait until the
    /// TCP listener accepts connections.
    pub async fn start(config: LogharborConfig) -> Self {
        let addr: SocketAddr = format!("127.0.0.1:{}", config.listener.tcp_port)
            .parse()
            .expect("valid loopback addr");
        let mut orchestrator =
            Orchestrator::build_from_config(config).expect("orchestrator should build");

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = orchestrator
                .run_until(async {
                    let _ = stop_rx.await;
                    "test-stop"
                })
                .await;
            (orchestrator, result)
        });

        let deadline = tokio::time::Instant::now() + READY_TIMEOUT;
        loop {
            if TcpStream::connect(addr).await.is_ok() {
                break;
            }
            assert!(!task.is_finished(), "daemon exited before becoming ready");
            assert!(
                tokio::time::Instant::now() < deadline,
                "daemon did not become ready on {addr}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self {
            addr,
            stop_tx,
            task,
        }
    }

    /// Send one UDP datagram to the daemon.
    pub async fn send_udp(&self, payload: &[u8]) {
        let client = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("failed to bind client");
        client
            .send_to(payload, self.addr)
            .await
            .expect("failed to send datagram");
    }

    /// Send one message over a fresh TCP connection.
    pub async fn send_tcp(&self, payload: &[u8]) {
        let mut client = TcpStream::connect(self.addr)
            .await
            .expect("failed to connect");
        client.write_all(payload).await.expect("failed to write");
        client.shutdown().await.expect("failed to shut down write half");
    }

    /// Signal shutdown and wait for the run loop to return.
    pub async fn stop(self) -> (Orchestrator, anyhow::Result<()>) {
        let _ = self.stop_tx.send(());
        self.task.await.expect("daemon task panicked")
    }
}
