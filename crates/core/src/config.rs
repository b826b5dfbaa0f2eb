//! 설정 관리 -- logharbor.toml 파싱 및 런타임 설정
//!
//! [`LogharborConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGHARBOR_LISTENER_UDP_PORT=5514` 형식)
//! 3. 설정 파일 (`logharbor.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logharbor_core::error::LogharborError> {
//! use logharbor_core::config::LogharborConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogharborConfig::load("logharbor.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogharborConfig::parse("[store]\nmax_logs = 500")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogharborError};

/// 기본 수신 포트 (UDP/TCP 공통)
pub const DEFAULT_PORT: u16 = 1514;

/// 한 번의 recv/read로 받는 최대 바이트 수
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8192;

/// 보존할 최대 레코드 수
pub const DEFAULT_MAX_LOGS: u64 = 1000;

/// logharbor 통합 설정
///
/// `logharbor.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogharborConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 네트워크 리스너 설정
    #[serde(default)]
    pub listener: ListenerConfig,
    /// 저장소 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// 라이브 피드 설정
    #[serde(default)]
    pub live: LiveConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogharborConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogharborError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogharborError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogharborError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogharborError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogharborError> {
        toml::from_str(toml_str).map_err(|e| {
            LogharborError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGHARBOR_{SECTION}_{FIELD}`
    /// 예: `LOGHARBOR_STORE_MAX_LOGS=5000`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGHARBOR_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGHARBOR_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "LOGHARBOR_GENERAL_DATA_DIR");
        override_string(&mut self.general.pid_file, "LOGHARBOR_GENERAL_PID_FILE");

        // Listener
        override_string(
            &mut self.listener.bind_addr,
            "LOGHARBOR_LISTENER_BIND_ADDR",
        );
        override_u16(&mut self.listener.udp_port, "LOGHARBOR_LISTENER_UDP_PORT");
        override_u16(&mut self.listener.tcp_port, "LOGHARBOR_LISTENER_TCP_PORT");
        override_usize(
            &mut self.listener.max_message_size,
            "LOGHARBOR_LISTENER_MAX_MESSAGE_SIZE",
        );
        override_u32(
            &mut self.listener.tcp_backlog,
            "LOGHARBOR_LISTENER_TCP_BACKLOG",
        );
        override_usize(
            &mut self.listener.max_connections,
            "LOGHARBOR_LISTENER_MAX_CONNECTIONS",
        );
        override_u64(
            &mut self.listener.read_timeout_secs,
            "LOGHARBOR_LISTENER_READ_TIMEOUT_SECS",
        );

        // Store
        override_string(
            &mut self.store.database_url,
            "LOGHARBOR_STORE_DATABASE_URL",
        );
        override_u64(&mut self.store.max_logs, "LOGHARBOR_STORE_MAX_LOGS");
        override_usize(
            &mut self.store.queue_capacity,
            "LOGHARBOR_STORE_QUEUE_CAPACITY",
        );

        // Live
        override_u64(
            &mut self.live.flush_interval_ms,
            "LOGHARBOR_LIVE_FLUSH_INTERVAL_MS",
        );
        override_usize(
            &mut self.live.channel_capacity,
            "LOGHARBOR_LIVE_CHANNEL_CAPACITY",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGHARBOR_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "LOGHARBOR_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "LOGHARBOR_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogharborError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.listener.bind_addr.parse::<std::net::IpAddr>().is_err() {
            return Err(invalid(
                "listener.bind_addr",
                format!("'{}' is not an IP address", self.listener.bind_addr),
            ));
        }

        if self.listener.udp_port == 0 {
            return Err(invalid("listener.udp_port", "must be greater than 0"));
        }

        if self.listener.tcp_port == 0 {
            return Err(invalid("listener.tcp_port", "must be greater than 0"));
        }

        // UDP 데이터그램 최대 크기
        if self.listener.max_message_size == 0 || self.listener.max_message_size > 65_535 {
            return Err(invalid(
                "listener.max_message_size",
                "must be between 1 and 65535",
            ));
        }

        if self.listener.tcp_backlog == 0 {
            return Err(invalid("listener.tcp_backlog", "must be greater than 0"));
        }

        if self.listener.max_connections == 0 {
            return Err(invalid(
                "listener.max_connections",
                "must be greater than 0",
            ));
        }

        if self.listener.read_timeout_secs == 0 {
            return Err(invalid(
                "listener.read_timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.store.database_url.is_empty() {
            return Err(invalid("store.database_url", "must not be empty"));
        }

        if self.store.max_logs == 0 {
            return Err(invalid("store.max_logs", "must be greater than 0"));
        }

        if self.store.queue_capacity == 0 {
            return Err(invalid("store.queue_capacity", "must be greater than 0"));
        }

        if self.live.flush_interval_ms == 0 {
            return Err(invalid("live.flush_interval_ms", "must be greater than 0"));
        }

        if self.live.channel_capacity == 0 {
            return Err(invalid("live.channel_capacity", "must be greater than 0"));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(invalid(
                "metrics.port",
                "must be greater than 0 when metrics are enabled",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> LogharborError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리
    pub data_dir: String,
    /// PID 파일 경로 (빈 문자열이면 생성하지 않음)
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            data_dir: "/var/lib/logharbor".to_owned(),
            pid_file: "/var/run/logharbor.pid".to_owned(),
        }
    }
}

/// 네트워크 리스너 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// 바인드 주소 (모든 인터페이스: 0.0.0.0)
    pub bind_addr: String,
    /// UDP 수신 포트
    pub udp_port: u16,
    /// TCP 수신 포트
    pub tcp_port: u16,
    /// 메시지 최대 크기 (바이트). 초과분은 잘립니다.
    pub max_message_size: usize,
    /// TCP listen backlog
    pub tcp_backlog: u32,
    /// 동시 처리 TCP 연결 수
    pub max_connections: usize,
    /// TCP 읽기 타임아웃 (초)
    pub read_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_owned(),
            udp_port: DEFAULT_PORT,
            tcp_port: DEFAULT_PORT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            tcp_backlog: 50,
            max_connections: 256,
            read_timeout_secs: 5,
        }
    }
}

/// 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 데이터베이스 URL (예: `sqlite:///var/lib/logharbor/logs.db?mode=rwc`)
    pub database_url: String,
    /// 보존할 최대 레코드 수
    pub max_logs: u64,
    /// 수집 큐 용량
    pub queue_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:///var/lib/logharbor/logs.db?mode=rwc".to_owned(),
            max_logs: DEFAULT_MAX_LOGS,
            queue_capacity: 10_000,
        }
    }
}

/// 라이브 피드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// 버퍼 플러시 간격 (밀리초)
    pub flush_interval_ms: u64,
    /// 구독자 채널 용량
    pub channel_capacity: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            flush_interval_ms: 1000,
            channel_capacity: 1024,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 엔드포인트 활성화 여부
    pub enabled: bool,
    /// 수신 주소
    pub listen_addr: String,
    /// 수신 포트
    pub port: u16,
    /// 엔드포인트 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, env_key: &str, type_name: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                expected = type_name,
                "failed to parse env var, ignoring"
            ),
        }
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    override_parsed(target, env_key, "bool");
}

fn override_u16(target: &mut u16, env_key: &str) {
    override_parsed(target, env_key, "u16");
}

fn override_u32(target: &mut u32, env_key: &str) {
    override_parsed(target, env_key, "u32");
}

fn override_u64(target: &mut u64, env_key: &str) {
    override_parsed(target, env_key, "u64");
}

fn override_usize(target: &mut usize, env_key: &str) {
    override_parsed(target, env_key, "usize");
}
