//! 저장 큐 소비자 -- 레코드를 하나씩 저장하고 보존 정책을 적용

use logharbor_core::metrics as m;
use logharbor_core::types::LogRecord;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::RecordStore;
use crate::error::LogPipelineError;

/// 저장소를 소유하는 단일 쓰기 태스크
///
/// 큐에서 받은 순서(FIFO)대로 한 건씩 처리합니다. 한 건의 실패는 로그로 남기고
/// 다음 레코드로 넘어갑니다. 모든 송신자가 drop되면 남은 항목을 처리한 뒤 종료합니다.
pub struct StoreWriter {
    store: RecordStore,
    max_logs: u64,
}

/// 쓰기 태스크 종료 시 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// 삽입에 성공한 레코드 수
    pub stored: u64,
    /// 삽입에 실패한 레코드 수
    pub failed: u64,
    pub purged: u64,
    /// 삽입 후 보존 정책 적용에 실패한 횟수 (행은 저장됨)
    pub retention_failed: u64,
}

impl StoreWriter {
    pub fn new(store: RecordStore, max_logs: u64) -> Self {
        Self { store, max_logs }
    }

    /// 큐가 닫힐 때까지 레코드를 저장합니다.
    pub async fn run(self, mut rx: mpsc::Receiver<LogRecord>) -> WriterStats {
        let mut stats = WriterStats::default();

        while let Some(record) = rx.recv().await {
            match self.store.insert(&record).await {
                Ok(id) => {
                    stats.stored += 1;
                    metrics::counter!(m::RECORDS_STORED_TOTAL).increment(1);
                    debug!(id, format = %record.format_type, "record stored");
                }
                Err(e) => {
                    stats.failed += 1;
                    metrics::counter!(m::STORE_ERRORS_TOTAL).increment(1);
                    error!(error = %e, record = %record, "failed to persist record");
                    continue;
                }
            }

            match self.apply_retention().await {
                Ok(purged) => stats.purged += purged,
                Err(e) => {
                    stats.retention_failed += 1;
                    metrics::counter!(m::STORE_ERRORS_TOTAL).increment(1);
                    error!(error = %e, max_logs = self.max_logs, "failed to enforce retention");
                }
            }
        }

        info!(
            stored = stats.stored,
            failed = stats.failed,
            purged = stats.purged,
            retention_failed = stats.retention_failed,
            "store writer drained and stopped"
        );
        stats
    }

    /// 보존 정책을 적용하고 삭제한 행 수를 반환합니다.
    async fn apply_retention(&self) -> Result<u64, LogPipelineError> {
        let purged = self.store.enforce_retention(self.max_logs).await?;
        if purged > 0 {
            metrics::counter!(m::RECORDS_PURGED_TOTAL).increment(purged);
            info!(purged, max_logs = self.max_logs, "purged {purged} records");
        }
        Ok(purged)
    }
}
