//! 로그 파싱 모듈 -- CEF, LEEF, Syslog RFC 5424, BSD syslog 파서와 디스패처
//!
//! [`FormatDispatcher`]는 정규화된 텍스트의 형태를 보고 시도할 파서를 고른 뒤,
//! 첫 번째로 일치한 결과로 [`LogRecord`]를 만듭니다.
//! 각 파서는 core의 [`LogParser`] trait을 구현합니다.
//!
//! # 결정 표
//!
//! | 조건 (위에서부터) | 시도할 파서 |
//! |---|---|
//! | 텍스트 어디든 `CEF:` 포함 | CEF |
//! | `LEEF:`로 시작 | LEEF |
//! | `<`로 시작 | RFC 5424, 실패 시 BSD |
//! | 그 외 | 없음 (`UNKNOWN`) |
//!
//! 파서 내부 실패([`ParseOutcome::Failed`])는 불일치와 동일하게 다음 후보로 넘어갑니다.
//! 모든 후보가 실패하면 `UNKNOWN` 레코드가 되며 원문은 항상 보존됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use logharbor_log_pipeline::parser::FormatDispatcher;
//!
//! let dispatcher = FormatDispatcher::new();
//! let record = dispatcher.dispatch("<34>Oct 11 22:14:15 mymachine su: failed", "10.0.0.5", &now);
//! assert_eq!(record.host, "mymachine");
//! ```

pub mod bsd;
pub mod cef;
pub mod leef;
pub mod rfc5424;

pub use bsd::BsdSyslogParser;
pub use cef::CefParser;
pub use leef::LeefParser;
pub use rfc5424::Rfc5424Parser;

use std::fmt;
use std::sync::Arc;

use logharbor_core::metrics as m;
use logharbor_core::pipeline::{LogParser, ParseOutcome};
use logharbor_core::types::{FormatType, LogRecord};

use cef::CEF_MARKER;
use leef::LEEF_MARKER;

/// 형식 디스패처
///
/// 파서 목록은 `Arc`로 공유되므로 수집기마다 복제해도 비용이 없습니다.
#[derive(Clone)]
pub struct FormatDispatcher {
    /// 등록된 파서 (`LogParser::format()`으로 후보와 대응)
    parsers: Arc<Vec<Box<dyn LogParser>>>,
}

impl FormatDispatcher {
    /// 기본 파서 세트 (CEF, LEEF, RFC 5424, BSD)로 디스패처를 생성합니다.
    pub fn new() -> Self {
        let parsers: Vec<Box<dyn LogParser>> = vec![
            Box::new(CefParser),
            Box::new(LeefParser),
            Box::new(Rfc5424Parser),
            Box::new(BsdSyslogParser),
        ];
        Self {
            parsers: Arc::new(parsers),
        }
    }

    /// 등록된 파서의 형식 목록
    pub fn formats(&self) -> Vec<FormatType> {
        self.parsers.iter().map(|p| p.format()).collect()
    }

    /// 텍스트에 대해 시도할 형식을 우선순위 순서로 반환합니다.
    pub fn candidates(text: &str) -> &'static [FormatType] {
        if text.contains(CEF_MARKER) {
            &[FormatType::Cef]
        } else if text.starts_with(LEEF_MARKER) {
            &[FormatType::Leef]
        } else if text.starts_with('<') {
            &[FormatType::SyslogRfc5424, FormatType::SyslogBsd]
        } else {
            &[]
        }
    }

    /// 정규화된 텍스트 한 건을 분류하여 레코드를 만듭니다.
    ///
    /// # Arguments
    ///
    /// * `text` - 인코딩 정규화를 거친 텍스트 (레코드의 `raw`가 됨)
    /// * `peer_host` - 형식에 호스트가 없을 때 사용할 피어 주소
    /// * `accepted_at` - 형식에 시각이 없을 때 사용할 수신 시각 (ISO-8601)
    pub fn dispatch(&self, text: &str, peer_host: &str, accepted_at: &str) -> LogRecord {
        for &format in Self::candidates(text) {
            let Some(parser) = self.parser_for(format) else {
                continue;
            };
            match parser.parse(text) {
                ParseOutcome::Matched(fields) => {
                    metrics::counter!(m::RECORDS_PARSED_TOTAL, m::LABEL_FORMAT => format.as_str())
                        .increment(1);
                    return LogRecord::assemble(format, fields, text, peer_host, accepted_at);
                }
                ParseOutcome::NoMatch => {}
                ParseOutcome::Failed(reason) => {
                    tracing::debug!(
                        format = %format,
                        peer = peer_host,
                        reason = %reason,
                        "parser failed, falling through"
                    );
                    metrics::counter!(m::PARSE_FAILURES_TOTAL, m::LABEL_FORMAT => format.as_str())
                        .increment(1);
                }
            }
        }

        metrics::counter!(
            m::RECORDS_PARSED_TOTAL,
            m::LABEL_FORMAT => FormatType::Unknown.as_str()
        )
        .increment(1);
        LogRecord::unknown(text, peer_host, accepted_at)
    }

    fn parser_for(&self, format: FormatType) -> Option<&dyn LogParser> {
        self.parsers
            .iter()
            .find(|p| p.format() == format)
            .map(|p| p.as_ref())
    }
}

impl Default for FormatDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDispatcher")
            .field("formats", &self.formats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PEER: &str = "192.0.2.10";
    const NOW: &str = "2026-06-01T00:00:00+00:00";

    fn dispatch(text: &str) -> LogRecord {
        FormatDispatcher::new().dispatch(text, PEER, NOW)
    }

    #[test]
    fn candidates_follow_priority_table() {
        assert_eq!(
            FormatDispatcher::candidates("<1>x CEF:0|a"),
            &[FormatType::Cef]
        );
        assert_eq!(
            FormatDispatcher::candidates("LEEF:1.0 CEF:0"),
            &[FormatType::Cef]
        );
        assert_eq!(
            FormatDispatcher::candidates("LEEF:1.0\tsrc=a"),
            &[FormatType::Leef]
        );
        assert_eq!(
            FormatDispatcher::candidates("<13>..."),
            &[FormatType::SyslogRfc5424, FormatType::SyslogBsd]
        );
        assert!(FormatDispatcher::candidates("plain").is_empty());
    }

    #[test]
    fn every_candidate_format_has_a_registered_parser() {
        let dispatcher = FormatDispatcher::new();
        assert_eq!(
            dispatcher.formats(),
            vec![
                FormatType::Cef,
                FormatType::Leef,
                FormatType::SyslogRfc5424,
                FormatType::SyslogBsd,
            ]
        );
        for text in ["CEF:0|a", "LEEF:1.0", "<13>x", "plain"] {
            for &format in FormatDispatcher::candidates(text) {
                assert!(dispatcher.parser_for(format).is_some(), "{format}");
            }
        }
        assert!(dispatcher.parser_for(FormatType::Unknown).is_none());
    }

    #[test]
    fn rfc5424_reference_record() {
        let rec = dispatch("<165>1 2026-01-05T12:00:00Z testhost app 12345 ID1 - Hello");
        assert_eq!(rec.format_type, FormatType::SyslogRfc5424);
        assert_eq!(rec.timestamp, "2026-01-05T12:00:00+00:00");
        assert_eq!(rec.host, "testhost");
        assert_eq!(rec.message, "Hello");
        assert_eq!(rec.message_id.as_deref(), Some("ID1"));
    }

    #[test]
    fn bsd_fallback_after_rfc5424_no_match() {
        let rec = dispatch("<34>Oct 11 22:14:15 mymachine su: failed login");
        assert_eq!(rec.format_type, FormatType::SyslogBsd);
        assert_eq!(rec.host, "mymachine");
        assert_eq!(rec.message, "su: failed login");
    }

    #[test]
    fn leef_reference_record() {
        let rec = dispatch("LEEF:1.0\tVendor\tProduct\t1.0\tEventID\tsrc=10.0.0.1\tsev=5\tmsg=test");
        assert_eq!(rec.format_type, FormatType::Leef);
        assert_eq!(rec.host, "10.0.0.1");
        assert_eq!(rec.severity.as_deref(), Some("5"));
        assert_eq!(rec.message, "test");
        assert_eq!(rec.timestamp, NOW);
    }

    #[test]
    fn cef_wins_over_leef_prefix() {
        let rec = dispatch("LEEF:1.0 CEF:0|V|P|1|1|Name|1|src=9.9.9.9");
        assert_eq!(rec.format_type, FormatType::Cef);
        assert_eq!(rec.host, "9.9.9.9");
    }

    #[test]
    fn cef_wins_over_syslog_header() {
        let rec = dispatch("<134>1 2026-01-05T12:00:00Z h a p m - CEF:0|V|P|1|1|N|1|msg=x");
        assert_eq!(rec.format_type, FormatType::Cef);
        assert_eq!(rec.message, "CEF Event: N msg=x");
        assert_eq!(rec.timestamp, NOW);
    }

    #[test]
    fn broken_cef_becomes_unknown() {
        let text = "garbage CEF:0|only|two";
        let rec = dispatch(text);
        assert_eq!(rec.format_type, FormatType::Unknown);
        assert_eq!(rec.message, text);
        assert_eq!(rec.raw, text);
        assert_eq!(rec.host, PEER);
    }

    #[test]
    fn unmatched_syslog_becomes_unknown() {
        let rec = dispatch("<not syslog at all");
        assert_eq!(rec.format_type, FormatType::Unknown);
        assert_eq!(rec.host, PEER);
        assert_eq!(rec.timestamp, NOW);
    }

    #[test]
    fn plain_text_is_unknown_with_defaults() {
        let rec = dispatch("hello from a printer");
        assert_eq!(rec.format_type, FormatType::Unknown);
        assert_eq!(rec.message, "hello from a printer");
        assert_eq!(rec.host, PEER);
        assert_eq!(rec.timestamp, NOW);
        assert!(rec.severity.is_none());
        assert!(rec.user.is_none());
        assert!(rec.device.is_none());
        assert!(rec.message_id.is_none());
    }

    #[test]
    fn raw_is_always_the_input_text() {
        for text in [
            "<165>1 2026-01-05T12:00:00Z testhost app 12345 ID1 - Hello",
            "LEEF:1.0\tsrc=a",
            "CEF:0|V|P|1|1|N|1|src=b",
            "nothing",
        ] {
            assert_eq!(dispatch(text).raw, text);
        }
    }

    proptest! {
        #[test]
        fn unmatched_text_is_unknown_with_message_equal_raw(s in "[a-zA-Z0-9 ,.;!?]{0,80}") {
            let rec = dispatch(&s);
            prop_assert_eq!(rec.format_type, FormatType::Unknown);
            prop_assert_eq!(&rec.message, &rec.raw);
        }

        #[test]
        fn dispatch_never_panics(s in "\\PC{0,200}") {
            let rec = dispatch(&s);
            prop_assert_eq!(rec.raw, s);
        }
    }
}
