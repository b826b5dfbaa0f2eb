//! Store polling assertions for E2E tests.
//!
//! The daemon owns the writer, so tests observe results by opening a
//! second connection to the same SQLite file.

use std::time::Duration;

use logharbor_core::types::StoredRecord;
use logharbor_log_pipeline::RecordStore;

/// Default timeout for store assertions.
#[allow(dead_code)]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Short window for asserting that nothing arrives.
#[allow(dead_code)]
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(300);

/// Poll the store until `done` accepts the stored rows (newest first).
///
/// # Panics
///
/// Panics if the timeout expires first.
#[allow(dead_code)]
pub async fn wait_for_rows<F>(database_url: &str, timeout: Duration, mut done: F) -> Vec<StoredRecord>
where
    F: FnMut(&[StoredRecord]) -> bool,
{
    let store = RecordStore::connect(database_url)
        .await
        .expect("failed to open store");
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let rows = store.recent(10_000).await.expect("failed to query store");
        if done(&rows) {
            let _ = store.close().await;
            return rows;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out after {timeout:?} waiting for rows, last: {rows:?}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Wait until exactly `count` rows are stored.
#[allow(dead_code)]
pub async fn wait_for_count(database_url: &str, count: usize) -> Vec<StoredRecord> {
    wait_for_rows(database_url, DEFAULT_TIMEOUT, |rows| rows.len() == count).await
}

/// Assert that the store row count stays at `count` for a short window.
#[allow(dead_code)]
pub async fn assert_count_stays(database_url: &str, count: u64) {
    tokio::time::sleep(SHORT_TIMEOUT).await;
    let store = RecordStore::connect(database_url)
        .await
        .expect("failed to open store");
    assert_eq!(store.count().await.expect("failed to count"), count);
    let _ = store.close().await;
}
