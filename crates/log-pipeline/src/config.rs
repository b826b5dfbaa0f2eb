//! 로그 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`LogharborConfig`]에서
//! listener/store/live 섹션을 모아 파이프라인 전용 설정으로 만듭니다.
//!
//! # 사용 예시
//! ```ignore
//! use logharbor_core::config::LogharborConfig;
//! use logharbor_log_pipeline::config::PipelineConfig;
//!
//! let core_config = LogharborConfig::default();
//! let config = PipelineConfig::from_core(&core_config);
//! ```

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use logharbor_core::config::LogharborConfig;
use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;

/// 로그 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 리스너 바인드 IP
    pub bind_addr: String,
    /// UDP 포트 (0이면 OS가 할당)
    pub udp_port: u16,
    /// TCP 포트 (0이면 OS가 할당)
    pub tcp_port: u16,
    /// 메시지 최대 크기 (바이트)
    pub max_message_size: usize,
    /// TCP listen backlog
    pub tcp_backlog: u32,
    /// 동시 TCP 연결 수
    pub max_connections: usize,
    /// TCP 읽기 타임아웃 (초)
    pub read_timeout_secs: u64,
    /// 데이터베이스 URL
    pub database_url: String,
    /// 보존할 최대 레코드 수
    pub max_logs: u64,
    /// 수집 큐 용량
    pub queue_capacity: usize,
    /// 라이브 버퍼 플러시 간격 (밀리초)
    pub flush_interval_ms: u64,
    /// 라이브 구독 채널 용량
    pub live_channel_capacity: usize,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// 종료 시 저장 큐 드레인 대기 시간 (초)
    pub shutdown_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_core(&LogharborConfig::default())
    }
}

impl PipelineConfig {
    /// core 설정에서 파이프라인 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &LogharborConfig) -> Self {
        Self {
            bind_addr: core.listener.bind_addr.clone(),
            udp_port: core.listener.udp_port,
            tcp_port: core.listener.tcp_port,
            max_message_size: core.listener.max_message_size,
            tcp_backlog: core.listener.tcp_backlog,
            max_connections: core.listener.max_connections,
            read_timeout_secs: core.listener.read_timeout_secs,
            database_url: core.store.database_url.clone(),
            max_logs: core.store.max_logs,
            queue_capacity: core.store.queue_capacity,
            flush_interval_ms: core.live.flush_interval_ms,
            live_channel_capacity: core.live.channel_capacity,
            shutdown_timeout_secs: 10,
        }
    }

    /// UDP 바인드 주소
    pub fn udp_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        Ok(SocketAddr::new(self.bind_ip()?, self.udp_port))
    }

    /// TCP 바인드 주소
    pub fn tcp_addr(&self) -> Result<SocketAddr, LogPipelineError> {
        Ok(SocketAddr::new(self.bind_ip()?, self.tcp_port))
    }

    /// 라이브 버퍼 플러시 간격
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// TCP 읽기 타임아웃
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    fn bind_ip(&self) -> Result<IpAddr, LogPipelineError> {
        self.bind_addr
            .parse::<IpAddr>()
            .map_err(|e| LogPipelineError::Config {
                field: "bind_addr".to_owned(),
                reason: format!("'{}': {}", self.bind_addr, e),
            })
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        const MAX_QUEUE_CAPACITY: usize = 10_000_000;
        const MAX_FLUSH_INTERVAL_MS: u64 = 60_000;

        self.bind_ip()?;

        if self.max_message_size == 0 || self.max_message_size > 65_535 {
            return Err(LogPipelineError::Config {
                field: "max_message_size".to_owned(),
                reason: "must be 1-65535".to_owned(),
            });
        }

        if self.tcp_backlog == 0 {
            return Err(LogPipelineError::Config {
                field: "tcp_backlog".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.max_connections == 0 {
            return Err(LogPipelineError::Config {
                field: "max_connections".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.read_timeout_secs == 0 {
            return Err(LogPipelineError::Config {
                field: "read_timeout_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.database_url.is_empty() {
            return Err(LogPipelineError::Config {
                field: "database_url".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.max_logs == 0 {
            return Err(LogPipelineError::Config {
                field: "max_logs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(LogPipelineError::Config {
                field: "queue_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_QUEUE_CAPACITY),
            });
        }

        if self.flush_interval_ms == 0 || self.flush_interval_ms > MAX_FLUSH_INTERVAL_MS {
            return Err(LogPipelineError::Config {
                field: "flush_interval_ms".to_owned(),
                reason: format!("must be 1-{}", MAX_FLUSH_INTERVAL_MS),
            });
        }

        if self.live_channel_capacity == 0 {
            return Err(LogPipelineError::Config {
                field: "live_channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
///
/// 3개 이상의 설정 필드가 있으므로 빌더 패턴을 사용합니다.
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 리스너 바인드 IP를 설정합니다.
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// UDP 포트를 설정합니다.
    pub fn udp_port(mut self, port: u16) -> Self {
        self.config.udp_port = port;
        self
    }

    /// TCP 포트를 설정합니다.
    pub fn tcp_port(mut self, port: u16) -> Self {
        self.config.tcp_port = port;
        self
    }

    /// 메시지 최대 크기를 설정합니다.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// 동시 TCP 연결 수를 설정합니다.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    /// TCP 읽기 타임아웃을 설정합니다.
    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.config.read_timeout_secs = secs;
        self
    }

    /// 데이터베이스 URL을 설정합니다.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// 보존할 최대 레코드 수를 설정합니다.
    pub fn max_logs(mut self, max: u64) -> Self {
        self.config.max_logs = max;
        self
    }

    /// 수집 큐 용량을 설정합니다.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// 라이브 버퍼 플러시 간격을 설정합니다.
    pub fn flush_interval_ms(mut self, ms: u64) -> Self {
        self.config.flush_interval_ms = ms;
        self
    }

    /// 종료 드레인 대기 시간을 설정합니다.
    pub fn shutdown_timeout_secs(mut self, secs: u64) -> Self {
        self.config.shutdown_timeout_secs = secs;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
