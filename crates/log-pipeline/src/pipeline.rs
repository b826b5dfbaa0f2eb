//! 파이프라인 오케스트레이션 -- 수신/분류/저장/라이브 발행의 전체 흐름을 관리합니다.
//!
//! [`LogPipeline`]은 core의 [`Pipeline`] trait을 구현하여
//! `logharbor-daemon`에서 동일한 생명주기로 관리됩니다.
//!
//! # 내부 아키텍처
//! ```text
//!                      +-> mpsc (bounded) -> StoreWriter -> SQLite
//! UDP/TCP -> Ingestor -+
//!                      +-> LiveBuffer -> flusher (interval) -> LiveFeed -> subscribers
//! ```
//!
//! # 종료 순서
//! 1. 취소 토큰으로 리스너와 연결 태스크를 중단 (큐 송신자가 모두 drop됨)
//! 2. 저장 태스크가 남은 큐를 비울 때까지 `shutdown_timeout_secs` 동안 대기
//! 3. 라이브 플러셔가 마지막 플러시 후 종료

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use logharbor_core::error::{LogharborError, PipelineError};
use logharbor_core::pipeline::{HealthStatus, Pipeline};
use logharbor_core::types::LogRecord;

use crate::collector::syslog_tcp::TcpLimits;
use crate::collector::{SyslogTcpCollector, SyslogUdpCollector};
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::ingest::Ingestor;
use crate::live::{self, LiveBuffer, LiveFeed};
use crate::store::writer::WriterStats;
use crate::store::{RecordStore, StoreWriter};

/// 파이프라인 실행 상태
#[derive(Debug, Clone, PartialEq, Eq)]
enum PipelineState {
    /// 초기화됨, 아직 시작하지 않음
    Initialized,
    /// 실행 중
    Running,
    /// 정지됨
    Stopped,
}

/// 실행 중인 백그라운드 태스크
struct RunningTasks {
    cancel: CancellationToken,
    udp: JoinHandle<()>,
    tcp: JoinHandle<()>,
    writer: JoinHandle<WriterStats>,
    flusher: JoinHandle<()>,
}

/// 로그 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use logharbor_log_pipeline::{LogPipelineBuilder, PipelineConfig};
/// use logharbor_core::pipeline::Pipeline;
///
/// let mut pipeline = LogPipelineBuilder::new().config(config).build()?;
/// let mut live_rx = pipeline.subscribe();
///
/// pipeline.start().await?;
/// // ...
/// pipeline.stop().await?;
/// ```
pub struct LogPipeline {
    /// 파이프라인 설정
    config: PipelineConfig,
    /// 현재 상태
    state: PipelineState,
    /// 라이브 구독 채널 (시작 전에도 구독 가능)
    live_feed: LiveFeed,
    /// 조회용 저장소 핸들 (시작 후 사용 가능)
    store: Option<RecordStore>,
    udp_addr: Option<SocketAddr>,
    tcp_addr: Option<SocketAddr>,
    /// 백그라운드 태스크
    tasks: Option<RunningTasks>,
}

impl LogPipeline {
    /// 현재 상태를 반환합니다.
    pub fn state_name(&self) -> &str {
        match self.state {
            PipelineState::Initialized => "initialized",
            PipelineState::Running => "running",
            PipelineState::Stopped => "stopped",
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 라이브 피드를 구독합니다. 구독 이후 발행된 레코드만 수신합니다.
    pub fn subscribe(&self) -> broadcast::Receiver<LogRecord> {
        self.live_feed.subscribe()
    }

    /// 실제로 바인드된 UDP 주소 (실행 중일 때)
    pub fn udp_local_addr(&self) -> Option<SocketAddr> {
        self.udp_addr
    }

    /// 실제로 바인드된 TCP 주소 (실행 중일 때)
    pub fn tcp_local_addr(&self) -> Option<SocketAddr> {
        self.tcp_addr
    }

    /// 조회용 저장소 핸들
    ///
    /// 쓰기는 내부 저장 태스크만 수행하므로 조회 용도로만 사용해야 합니다.
    pub fn store(&self) -> Option<&RecordStore> {
        self.store.as_ref()
    }

    async fn launch(&mut self) -> Result<(), LogPipelineError> {
        let config = &self.config;

        // 1. 저장소 연결 (실패 시 치명적)
        let store = RecordStore::connect(&config.database_url).await?;

        // 2. 큐와 라이브 버퍼
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
        let live_buffer = LiveBuffer::new();
        let ingestor = Ingestor::new(queue_tx, live_buffer.clone());

        // 3. 리스너 바인드 (실패 시 치명적)
        let udp =
            SyslogUdpCollector::bind(config.udp_addr()?, config.max_message_size, ingestor.clone())
                .await?;
        let limits = TcpLimits {
            backlog: config.tcp_backlog,
            max_connections: config.max_connections,
            max_message_size: config.max_message_size,
            read_timeout: config.read_timeout(),
        };
        // 마지막 Ingestor를 넘겨 파이프라인이 큐 송신자를 보유하지 않도록 함
        let tcp = SyslogTcpCollector::bind(config.tcp_addr()?, limits, ingestor).await?;

        let udp_addr = udp.local_addr()?;
        let tcp_addr = tcp.local_addr()?;

        // 4. 태스크 스폰
        let cancel = CancellationToken::new();
        let writer = tokio::spawn(StoreWriter::new(store.clone(), config.max_logs).run(queue_rx));
        let flusher = tokio::spawn(live::run_flusher(
            live_buffer,
            self.live_feed.clone(),
            config.flush_interval(),
            cancel.clone(),
        ));
        let udp = tokio::spawn(udp.run(cancel.clone()));
        let tcp = tokio::spawn(tcp.run(cancel.clone()));

        tracing::info!(
            udp = %udp_addr,
            tcp = %tcp_addr,
            max_logs = config.max_logs,
            "log pipeline listening"
        );

        self.store = Some(store);
        self.udp_addr = Some(udp_addr);
        self.tcp_addr = Some(tcp_addr);
        self.tasks = Some(RunningTasks {
            cancel,
            udp,
            tcp,
            writer,
            flusher,
        });
        Ok(())
    }
}

impl Pipeline for LogPipeline {
    async fn start(&mut self) -> Result<(), LogharborError> {
        if self.state == PipelineState::Running {
            return Err(PipelineError::AlreadyRunning.into());
        }

        tracing::info!("starting log pipeline");
        self.launch().await?;
        self.state = PipelineState::Running;
        tracing::info!("log pipeline started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), LogharborError> {
        if self.state != PipelineState::Running {
            return Err(PipelineError::NotRunning.into());
        }

        tracing::info!("stopping log pipeline");

        if let Some(tasks) = self.tasks.take() {
            // 1. 리스너 중단 -> 큐 송신자 drop
            tasks.cancel.cancel();
            for (name, handle) in [("udp", tasks.udp), ("tcp", tasks.tcp)] {
                if let Err(e) = handle.await {
                    tracing::warn!(listener = name, error = %e, "listener task ended abnormally");
                }
            }

            // 2. 남은 큐 드레인 (제한 시간)
            let shutdown_timeout = Duration::from_secs(self.config.shutdown_timeout_secs);
            let mut writer = tasks.writer;
            match tokio::time::timeout(shutdown_timeout, &mut writer).await {
                Ok(Ok(stats)) => {
                    tracing::info!(
                        stored = stats.stored,
                        failed = stats.failed,
                        retention_failed = stats.retention_failed,
                        "store queue drained"
                    );
                }
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "store writer task failed");
                }
                Err(_) => {
                    writer.abort();
                    tracing::warn!(
                        timeout_secs = self.config.shutdown_timeout_secs,
                        "store queue drain timed out, remaining records abandoned"
                    );
                }
            }

            // 3. 마지막 라이브 플러시
            if let Err(e) = tasks.flusher.await {
                tracing::warn!(error = %e, "live flusher task ended abnormally");
            }
        }

        self.udp_addr = None;
        self.tcp_addr = None;
        self.state = PipelineState::Stopped;
        tracing::info!("log pipeline stopped");
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.state {
            PipelineState::Running => {
                let Some(tasks) = &self.tasks else {
                    return HealthStatus::Unhealthy("tasks missing".to_owned());
                };
                if tasks.writer.is_finished() {
                    HealthStatus::Unhealthy("store writer stopped".to_owned())
                } else if tasks.udp.is_finished() || tasks.tcp.is_finished() {
                    HealthStatus::Unhealthy("listener stopped".to_owned())
                } else if tasks.flusher.is_finished() {
                    HealthStatus::Degraded("live flusher stopped".to_owned())
                } else {
                    HealthStatus::Healthy
                }
            }
            PipelineState::Initialized => HealthStatus::Unhealthy("not started".to_owned()),
            PipelineState::Stopped => HealthStatus::Unhealthy("stopped".to_owned()),
        }
    }
}

/// 로그 파이프라인 빌더
pub struct LogPipelineBuilder {
    config: PipelineConfig,
}

impl LogPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 설정을 검증하고 파이프라인을 빌드합니다.
    pub fn build(self) -> Result<LogPipeline, LogPipelineError> {
        self.config.validate()?;

        let live_feed = LiveFeed::new(self.config.live_channel_capacity);

        Ok(LogPipeline {
            config: self.config,
            state: PipelineState::Initialized,
            live_feed,
            store: None,
            udp_addr: None,
            tcp_addr: None,
            tasks: None,
        })
    }
}

impl Default for LogPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
