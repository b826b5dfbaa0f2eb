#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`collector`]: UDP/TCP syslog 수신
//! - [`encoding`]: 원시 바이트의 인코딩 감지와 텍스트 복원
//! - [`parser`]: CEF, LEEF, RFC 5424, BSD syslog 파서와 형식 디스패처
//! - [`ingest`]: 정규화/분류 결과를 저장 큐와 라이브 버퍼로 전달
//! - [`store`]: SQLite 저장소, 단일 쓰기 태스크, 보존 정책
//! - [`live`]: 주기적 배치 발행 라이브 피드
//! - [`pipeline`]: 전체 파이프라인 오케스트레이션 (Pipeline trait 구현)
//! - [`config`]: 파이프라인 설정 (core 설정 변환)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! UDP/TCP -> normalize -> FormatDispatcher -> Ingestor -+-> queue -> StoreWriter -> SQLite
//!                                                       +-> LiveBuffer -> LiveFeed
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod ingest;
pub mod live;
pub mod pipeline;

pub mod collector;
pub mod parser;
pub mod store;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{LogPipeline, LogPipelineBuilder};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::{BsdSyslogParser, CefParser, FormatDispatcher, LeefParser, Rfc5424Parser};

// 수집기
pub use collector::{RawLog, SyslogTcpCollector, SyslogUdpCollector, Transport};

// 저장소
pub use store::{RecordStore, StoreWriter};

// 라이브 피드
pub use live::{LiveBuffer, LiveFeed};

pub use ingest::Ingestor;
