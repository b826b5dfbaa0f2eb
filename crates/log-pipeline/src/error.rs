//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for LogharborError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 파싱/디코딩 실패는 에러로 전파되지 않습니다. 파서는
//! [`ParseOutcome`](logharbor_core::pipeline::ParseOutcome)으로 결과를 돌려주고,
//! 디스패처가 `UNKNOWN`으로 분류합니다.

use logharbor_core::error::{LogharborError, PipelineError, StorageError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 리스너 바인드 실패 (시작 시 치명적)
    #[error("bind error: {transport} {addr}: {reason}")]
    Bind {
        /// 전송 계층 (udp, tcp)
        transport: &'static str,
        /// 바인드 대상 주소
        addr: String,
        /// 실패 사유
        reason: String,
    },

    /// 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    /// 저장소에서 읽은 값이 도메인 타입으로 변환되지 않음
    #[error("corrupt stored row {id}: {reason}")]
    CorruptRow {
        /// 행 ID
        id: i64,
        /// 변환 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for LogharborError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Bind { addr, reason, .. } => {
                LogharborError::Pipeline(PipelineError::BindFailed { addr, reason })
            }
            LogPipelineError::Store(e) => LogharborError::Storage(StorageError::Query(e.to_string())),
            corrupt @ LogPipelineError::CorruptRow { .. } => {
                LogharborError::Storage(StorageError::Query(corrupt.to_string()))
            }
            config @ LogPipelineError::Config { .. } => {
                LogharborError::Pipeline(PipelineError::InitFailed(config.to_string()))
            }
            LogPipelineError::Io(e) => LogharborError::Io(e),
        }
    }
}
