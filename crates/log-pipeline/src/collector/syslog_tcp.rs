//! TCP Syslog 수집기
//!
//! 연결 하나당 메시지 하나를 수신합니다. 수락한 연결마다 별도 태스크에서
//! `max_message_size` 바이트까지 한 번 읽고, 그 데이터를 메시지로 제출한 뒤 연결을 닫습니다.
//! 프레이밍은 없으며 읽기 전에 연결이 닫히면(0바이트) 아무것도 제출하지 않습니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use logharbor_core::metrics as m;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{RawLog, Transport};
use crate::error::LogPipelineError;
use crate::ingest::Ingestor;

/// TCP 수집기 연결 제한 설정
#[derive(Debug, Clone)]
pub struct TcpLimits {
    /// listen backlog
    pub backlog: u32,
    /// 최대 동시 연결 수
    pub max_connections: usize,
    /// 최대 메시지 크기 (바이트)
    pub max_message_size: usize,
    /// 첫 데이터 수신 대기 시간
    pub read_timeout: Duration,
}

impl Default for TcpLimits {
    fn default() -> Self {
        Self {
            backlog: 50,
            max_connections: 256,
            max_message_size: 8192,
            read_timeout: Duration::from_secs(5),
        }
    }
}

/// TCP Syslog 수집기
///
/// 동시 연결 수는 세마포어로 제한하며, 한도를 넘는 연결은 즉시 닫습니다.
pub struct SyslogTcpCollector {
    listener: TcpListener,
    limits: TcpLimits,
    ingestor: Ingestor,
}

impl SyslogTcpCollector {
    /// 주어진 주소에 TCP 리스너를 바인드합니다.
    pub async fn bind(
        addr: SocketAddr,
        limits: TcpLimits,
        ingestor: Ingestor,
    ) -> Result<Self, LogPipelineError> {
        let bind_err = |e: std::io::Error| LogPipelineError::Bind {
            transport: Transport::Tcp.as_str(),
            addr: addr.to_string(),
            reason: e.to_string(),
        };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(limits.backlog).map_err(bind_err)?;

        Ok(Self {
            listener,
            limits,
            ingestor,
        })
    }

    /// 실제로 바인드된 주소
    pub fn local_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        Ok(self.listener.local_addr()?)
    }

    /// 취소될 때까지 연결을 수락합니다.
    ///
    /// 수락 에러는 로그만 남기고 계속 진행합니다.
    pub async fn run(self, cancel: CancellationToken) {
        let local = self.listener.local_addr().ok();
        info!(
            addr = ?local,
            max_connections = self.limits.max_connections,
            "tcp syslog collector listening"
        );

        // 연결 수 제한을 위한 세마포어
        let connection_semaphore = Arc::new(Semaphore::new(self.limits.max_connections));

        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    let (stream, peer) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!(error = %e, "tcp accept failed");
                            continue;
                        }
                    };

                    let Ok(permit) = connection_semaphore.clone().try_acquire_owned() else {
                        metrics::counter!(m::TCP_CONNECTIONS_REJECTED_TOTAL).increment(1);
                        warn!(
                            peer = %peer,
                            max_connections = self.limits.max_connections,
                            "max connections reached, rejecting connection"
                        );
                        continue;
                    };

                    let ingestor = self.ingestor.clone();
                    let limits = self.limits.clone();
                    let cancel = cancel.clone();

                    // 각 연결을 별도 태스크에서 처리
                    tokio::spawn(async move {
                        Self::handle_connection(stream, peer, &ingestor, &limits, cancel).await;
                        drop(permit); // 연결 종료 시 세마포어 반환
                    });
                }
                _ = cancel.cancelled() => {
                    info!(addr = ?local, "tcp syslog collector stopped");
                    break;
                }
            }
        }
    }

    /// 단일 연결에서 메시지 하나를 읽고 연결을 닫습니다.
    async fn handle_connection(
        mut stream: TcpStream,
        peer: SocketAddr,
        ingestor: &Ingestor,
        limits: &TcpLimits,
        cancel: CancellationToken,
    ) {
        let mut buf = vec![0u8; limits.max_message_size];

        tokio::select! {
            result = timeout(limits.read_timeout, stream.read(&mut buf)) => {
                match result {
                    Ok(Ok(0)) => {
                        debug!(peer = %peer, "connection closed before any data");
                    }
                    Ok(Ok(len)) => {
                        debug!(peer = %peer, bytes = len, "tcp message received");
                        let raw = RawLog::new(
                            Bytes::copy_from_slice(&buf[..len]),
                            peer,
                            Transport::Tcp,
                        );
                        ingestor.ingest(&raw);
                    }
                    Ok(Err(e)) => {
                        warn!(peer = %peer, error = %e, "tcp read failed");
                    }
                    Err(_) => {
                        warn!(peer = %peer, timeout = ?limits.read_timeout, "tcp read timed out");
                    }
                }
            }
            _ = cancel.cancelled() => {
                debug!(peer = %peer, "connection handler cancelled");
            }
        }
        // stream drop 시 연결 종료
    }
}
