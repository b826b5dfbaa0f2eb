//! UDP Syslog 수집기
//!
//! 데이터그램 하나를 메시지 하나로 취급합니다.
//! `max_message_size`보다 큰 데이터그램은 잘립니다.

use std::net::SocketAddr;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{RawLog, Transport};
use crate::error::LogPipelineError;
use crate::ingest::Ingestor;

/// UDP Syslog 수집기
///
/// [`bind`](Self::bind)로 소켓을 먼저 열고, [`run`](Self::run)으로 수신 루프를 실행합니다.
/// 데이터그램은 한 번에 하나씩 처리됩니다.
pub struct SyslogUdpCollector {
    socket: UdpSocket,
    max_message_size: usize,
    ingestor: Ingestor,
}

impl SyslogUdpCollector {
    /// 주어진 주소에 UDP 소켓을 바인드합니다.
    pub async fn bind(
        addr: SocketAddr,
        max_message_size: usize,
        ingestor: Ingestor,
    ) -> Result<Self, LogPipelineError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| LogPipelineError::Bind {
                transport: Transport::Udp.as_str(),
                addr: addr.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            socket,
            max_message_size,
            ingestor,
        })
    }

    /// 실제로 바인드된 주소 (포트 0 바인드 시 할당된 포트 확인용)
    pub fn local_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        Ok(self.socket.local_addr()?)
    }

    /// 취소될 때까지 데이터그램을 수신합니다.
    ///
    /// 수신 에러는 로그만 남기고 계속 진행합니다.
    pub async fn run(self, cancel: CancellationToken) {
        let local = self.socket.local_addr().ok();
        info!(addr = ?local, "udp syslog collector listening");

        let mut buf = vec![0u8; self.max_message_size];
        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, peer)) => {
                            debug!(peer = %peer, bytes = len, "udp datagram received");
                            let raw = RawLog::new(
                                Bytes::copy_from_slice(&buf[..len]),
                                peer,
                                Transport::Udp,
                            );
                            self.ingestor.ingest(&raw);
                        }
                        Err(e) => {
                            warn!(error = %e, "udp receive failed");
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!(addr = ?local, "udp syslog collector stopped");
                    break;
                }
            }
        }
    }
}
