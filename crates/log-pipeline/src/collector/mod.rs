//! 로그 수집 모듈 -- 네트워크에서 원시 로그를 수신합니다.
//!
//! # 수집 소스
//! - [`SyslogUdpCollector`]: UDP 데이터그램 하나를 메시지 하나로 수신
//! - [`SyslogTcpCollector`]: 연결 하나에서 한 번 읽은 데이터를 메시지 하나로 수신
//!
//! # 아키텍처
//! 바인드는 파이프라인 시작 시점에 수행되며(실패 시 시작 중단),
//! 수신 루프는 각자의 tokio 태스크에서 `CancellationToken`이 취소될 때까지 실행됩니다.
//! 수신된 [`RawLog`]는 [`Ingestor`](crate::ingest::Ingestor)에 동기적으로 전달됩니다.

pub mod syslog_tcp;
pub mod syslog_udp;

pub use syslog_tcp::SyslogTcpCollector;
pub use syslog_udp::SyslogUdpCollector;

use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// 수신 전송 계층
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

impl Transport {
    /// 메트릭/로그 레이블 값
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 수집된 원시 로그 데이터
///
/// 수집기가 생성하고, 인제스터가 소비하는 중간 데이터 형식입니다.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// 원시 로그 바이트 (최대 메시지 크기로 잘린 상태)
    pub data: Bytes,
    /// 송신자 주소
    pub peer: SocketAddr,
    /// 수신 전송 계층
    pub transport: Transport,
    /// 수신 시각
    pub received_at: DateTime<Utc>,
}

impl RawLog {
    /// 새 RawLog를 생성합니다. 수신 시각은 현재 시각입니다.
    pub fn new(data: Bytes, peer: SocketAddr, transport: Transport) -> Self {
        Self {
            data,
            peer,
            transport,
            received_at: Utc::now(),
        }
    }
}
