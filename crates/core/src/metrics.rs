//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logharbor_`
//! - 접미어: `_total` (counter), `_seconds`/`_bytes` (단위), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logharbor_core::metrics::RECORDS_STORED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 전송 계층 레이블 키 (udp, tcp)
pub const LABEL_TRANSPORT: &str = "transport";

/// 로그 형식 레이블 키 (CEF, LEEF, SYSLOG_RFC5424, SYSLOG_BSD, UNKNOWN)
pub const LABEL_FORMAT: &str = "format";

// ─── 수집 ──────────────────────────────────────────────────────────

/// 수신된 메시지 수 (counter, label: transport)
pub const RECORDS_RECEIVED_TOTAL: &str = "logharbor_records_received_total";

/// 동시 연결 한도로 거절된 TCP 연결 수 (counter)
pub const TCP_CONNECTIONS_REJECTED_TOTAL: &str = "logharbor_tcp_connections_rejected_total";

// ─── 파싱 ──────────────────────────────────────────────────────────

/// 형식별 분류된 레코드 수 (counter, label: format)
pub const RECORDS_PARSED_TOTAL: &str = "logharbor_records_parsed_total";

/// 파서 내부 실패 수 (counter, label: format)
pub const PARSE_FAILURES_TOTAL: &str = "logharbor_parse_failures_total";

// ─── 저장 ──────────────────────────────────────────────────────────

/// 큐 포화로 버려진 레코드 수 (counter)
pub const RECORDS_DROPPED_TOTAL: &str = "logharbor_records_dropped_total";

/// 저장된 레코드 수 (counter)
pub const RECORDS_STORED_TOTAL: &str = "logharbor_records_stored_total";

/// 저장 실패 수 (counter)
pub const STORE_ERRORS_TOTAL: &str = "logharbor_store_errors_total";

/// 보존 정책으로 삭제된 레코드 수 (counter)
pub const RECORDS_PURGED_TOTAL: &str = "logharbor_records_purged_total";

// ─── 라이브 피드 ───────────────────────────────────────────────────

/// 구독자에게 발행된 레코드 수 (counter)
pub const LIVE_PUBLISHED_TOTAL: &str = "logharbor_live_published_total";

// ─── 프로세스 ──────────────────────────────────────────────────────

/// 프로세스 RSS (gauge, bytes)
pub const PROCESS_MEMORY_BYTES: &str = "logharbor_process_memory_bytes";

/// 데몬 가동 시간 (gauge, seconds)
pub const UPTIME_SECONDS: &str = "logharbor_uptime_seconds";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다. recorder가 없어도 안전합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        RECORDS_RECEIVED_TOTAL,
        "Total number of messages received per transport"
    );
    describe_counter!(
        TCP_CONNECTIONS_REJECTED_TOTAL,
        "TCP connections dropped because the connection limit was reached"
    );
    describe_counter!(
        RECORDS_PARSED_TOTAL,
        "Records classified per format (including UNKNOWN)"
    );
    describe_counter!(
        PARSE_FAILURES_TOTAL,
        "Parser attempts that failed internally and fell through"
    );
    describe_counter!(
        RECORDS_DROPPED_TOTAL,
        "Records dropped because the ingestion queue was full"
    );
    describe_counter!(RECORDS_STORED_TOTAL, "Records persisted to the store");
    describe_counter!(STORE_ERRORS_TOTAL, "Store write or retention failures");
    describe_counter!(
        RECORDS_PURGED_TOTAL,
        "Records deleted by retention enforcement"
    );
    describe_counter!(
        LIVE_PUBLISHED_TOTAL,
        "Records published to live subscribers"
    );
    describe_gauge!(PROCESS_MEMORY_BYTES, "Resident set size of the daemon");
    describe_gauge!(UPTIME_SECONDS, "Daemon uptime in seconds");
}
