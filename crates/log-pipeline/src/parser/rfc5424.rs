//! Syslog RFC 5424 파서
//!
//! [RFC 5424](https://tools.ietf.org/html/rfc5424) 형식 중 structured data가
//! NILVALUE(`-`)인 메시지를 파싱합니다.
//!
//! # 메시지 형식
//! ```text
//! <PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID - MSG
//! ```
//!
//! HOSTNAME, MSGID, MSG만 레코드에 반영되며 APP-NAME과 PROCID는 버립니다.
//! 타임스탬프는 RFC 3339로 다시 출력됩니다 (`Z`는 `+00:00`으로).

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use logharbor_core::pipeline::{LogParser, ParseOutcome};
use logharbor_core::types::{FormatType, ParsedFields};

/// NILVALUE
const NIL: &str = "-";

static RFC5424: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^<(\d+)>1\s+([\d\-T:\.]+(?:Z|[+\-]\d{2}:\d{2}))\s+([\w\.-]+)\s+([\w\.-]+|-)\s+([\w\.-]+|-)\s+([\w\.-]+|-)\s+-\s+(?s:(.+))",
    )
    .ok()
});

/// Syslog RFC 5424 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct Rfc5424Parser;

impl Rfc5424Parser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for Rfc5424Parser {
    fn format(&self) -> FormatType {
        FormatType::SyslogRfc5424
    }

    fn parse(&self, text: &str) -> ParseOutcome {
        let Some(re) = RFC5424.as_ref() else {
            return ParseOutcome::Failed("rfc5424 pattern unavailable".to_owned());
        };
        let Some(caps) = re.captures(text) else {
            return ParseOutcome::NoMatch;
        };

        let timestamp = match DateTime::parse_from_rfc3339(&caps[2]) {
            Ok(dt) => dt.to_rfc3339(),
            Err(e) => {
                return ParseOutcome::Failed(format!("invalid timestamp '{}': {e}", &caps[2]));
            }
        };

        let msgid = &caps[6];
        ParseOutcome::Matched(ParsedFields {
            timestamp: Some(timestamp),
            host: Some(caps[3].to_owned()),
            message: Some(caps[7].to_owned()),
            message_id: (msgid != NIL).then(|| msgid.to_owned()),
            ..Default::default()
        })
    }
}
