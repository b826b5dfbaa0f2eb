//! 인제스터 -- 원시 로그를 정규화/분류하여 저장 큐와 라이브 버퍼에 전달
//!
//! 수집기는 수신한 [`RawLog`]마다 [`Ingestor::ingest`]를 호출합니다.
//! 처리 순서:
//!
//! 1. [`encoding::normalize`]로 텍스트 복원
//! 2. [`FormatDispatcher`]로 레코드 생성 (피어 IP, 수신 시각을 기본값으로 사용)
//! 3. 저장 큐에 `try_send` -- 큐가 가득 차면 경고 로그와 함께 버림
//! 4. 저장 결과와 무관하게 라이브 버퍼에 추가
//!
//! 어떤 단계도 블로킹하지 않으므로 수신 루프를 멈추지 않습니다.

use logharbor_core::metrics as m;
use logharbor_core::types::LogRecord;
use tokio::sync::mpsc;
use tracing::warn;

use crate::collector::RawLog;
use crate::encoding;
use crate::live::LiveBuffer;
use crate::parser::FormatDispatcher;

/// 인제스터
///
/// 복제본은 같은 큐와 라이브 버퍼를 공유합니다.
#[derive(Debug, Clone)]
pub struct Ingestor {
    dispatcher: FormatDispatcher,
    queue: mpsc::Sender<LogRecord>,
    live: LiveBuffer,
}

impl Ingestor {
    pub fn new(queue: mpsc::Sender<LogRecord>, live: LiveBuffer) -> Self {
        Self {
            dispatcher: FormatDispatcher::new(),
            queue,
            live,
        }
    }

    /// 원시 로그 한 건을 처리하고 생성된 레코드를 반환합니다.
    pub fn ingest(&self, raw: &RawLog) -> LogRecord {
        metrics::counter!(m::RECORDS_RECEIVED_TOTAL, m::LABEL_TRANSPORT => raw.transport.as_str())
            .increment(1);

        let text = encoding::normalize(&raw.data);
        let peer_host = raw.peer.ip().to_string();
        let accepted_at = raw.received_at.to_rfc3339();
        let record = self.dispatcher.dispatch(&text, &peer_host, &accepted_at);

        self.enqueue(record.clone());
        self.live.push(record.clone());
        record
    }

    fn enqueue(&self, record: LogRecord) {
        match self.queue.try_send(record) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(record)) => {
                metrics::counter!(m::RECORDS_DROPPED_TOTAL).increment(1);
                warn!(
                    capacity = self.queue.max_capacity(),
                    record = %record,
                    "store queue full, record dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(record)) => {
                metrics::counter!(m::RECORDS_DROPPED_TOTAL).increment(1);
                warn!(record = %record, "store queue closed, record dropped");
            }
        }
    }
}
