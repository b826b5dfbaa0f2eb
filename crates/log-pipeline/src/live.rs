//! 라이브 피드 -- 수신된 레코드를 주기적으로 구독자에게 발행
//!
//! [`LiveBuffer`]는 디스패치된 모든 레코드를 저장 결과와 무관하게 모읍니다.
//! 플러시 태스크([`run_flusher`])는 고정 간격마다 버퍼 내용을 통째로 꺼내
//! 누적된 순서대로 [`LiveFeed`]에 한 건씩 발행합니다.
//!
//! 구독자가 없으면 발행은 조용히 버려지며 파이프라인에 역압을 걸지 않습니다.
//! 구독자는 구독 이후 발행된 레코드만 받습니다.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use logharbor_core::metrics as m;
use logharbor_core::types::LogRecord;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 발행 대기 중인 레코드 버퍼
///
/// 복제본은 같은 버퍼를 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct LiveBuffer {
    pending: Arc<Mutex<Vec<LogRecord>>>,
}

impl LiveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드를 추가합니다.
    pub fn push(&self, record: LogRecord) {
        self.lock().push(record);
    }

    /// 버퍼 내용을 원자적으로 꺼내고 비웁니다.
    pub fn drain(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        // 패닉한 보유자가 남긴 Vec도 그대로 사용 가능
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 라이브 구독 채널
#[derive(Debug, Clone)]
pub struct LiveFeed {
    tx: broadcast::Sender<LogRecord>,
}

impl LiveFeed {
    /// 구독자별 지연 허용량이 `capacity`인 피드를 생성합니다.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// 앞으로 발행될 레코드를 받는 구독자를 생성합니다.
    pub fn subscribe(&self) -> broadcast::Receiver<LogRecord> {
        self.tx.subscribe()
    }

    /// 레코드 한 건을 발행합니다. 받은 구독자 수를 반환합니다.
    pub fn publish(&self, record: LogRecord) -> usize {
        // 구독자가 없으면 Err -- 버림
        self.tx.send(record).unwrap_or(0)
    }

    /// 현재 구독자 수
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// 버퍼를 한 번 비워 발행합니다. 발행한 레코드 수를 반환합니다.
pub fn flush(buffer: &LiveBuffer, feed: &LiveFeed) -> usize {
    let batch = buffer.drain();
    let count = batch.len();
    if count == 0 {
        return 0;
    }
    for record in batch {
        feed.publish(record);
    }
    metrics::counter!(m::LIVE_PUBLISHED_TOTAL).increment(count as u64);
    debug!(
        count,
        subscribers = feed.subscriber_count(),
        "live batch flushed"
    );
    count
}

/// 취소될 때까지 `interval`마다 버퍼를 플러시합니다.
///
/// 취소 시 남은 레코드를 한 번 더 플러시한 뒤 종료합니다.
pub async fn run_flusher(
    buffer: LiveBuffer,
    feed: LiveFeed,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // 첫 tick은 즉시 완료됨
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                flush(&buffer, &feed);
            }
            _ = cancel.cancelled() => {
                let remaining = flush(&buffer, &feed);
                info!(remaining, "live flusher stopped");
                break;
            }
        }
    }
}
