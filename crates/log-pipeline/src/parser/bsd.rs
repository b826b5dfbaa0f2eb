//! BSD syslog (RFC 3164) 파서
//!
//! ```text
//! <PRI>MMM DD HH:MM:SS HOSTNAME MESSAGE
//! ```
//!
//! 와이어 형식에 연도가 없으므로 파싱 시점의 현재 연도(UTC)를 사용합니다.
//! 연말/연초 경계의 메시지는 잘못된 연도로 기록될 수 있으며, 이를 보정하지 않습니다.
//! 시각은 UTC로 해석합니다.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use regex::Regex;

use logharbor_core::pipeline::{LogParser, ParseOutcome};
use logharbor_core::types::{FormatType, ParsedFields};

static BSD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^<(\d+)>([A-Za-z]{3})\s+(\d{1,2})\s+(\d{2}):(\d{2}):(\d{2})\s+([\w.-]+)\s+(?s:(.+))",
    )
    .ok()
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// BSD syslog 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct BsdSyslogParser;

impl BsdSyslogParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for BsdSyslogParser {
    fn format(&self) -> FormatType {
        FormatType::SyslogBsd
    }

    fn parse(&self, text: &str) -> ParseOutcome {
        let Some(re) = BSD.as_ref() else {
            return ParseOutcome::Failed("bsd pattern unavailable".to_owned());
        };
        let Some(caps) = re.captures(text) else {
            return ParseOutcome::NoMatch;
        };

        let Some(month) = month_number(&caps[2]) else {
            return ParseOutcome::NoMatch;
        };

        // 정규식이 자릿수를 보장하므로 범위를 넘지 않음
        let (Ok(day), Ok(hour), Ok(minute), Ok(second)) = (
            caps[3].parse::<u32>(),
            caps[4].parse::<u32>(),
            caps[5].parse::<u32>(),
            caps[6].parse::<u32>(),
        ) else {
            return ParseOutcome::NoMatch;
        };

        let year = Utc::now().year();
        let Some(naive) = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
        else {
            return ParseOutcome::Failed(format!(
                "invalid date {year}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            ));
        };

        ParseOutcome::Matched(ParsedFields {
            timestamp: Some(Utc.from_utc_datetime(&naive).to_rfc3339()),
            host: Some(caps[7].to_owned()),
            message: Some(caps[8].to_owned()),
            ..Default::default()
        })
    }
}

fn month_number(abbrev: &str) -> Option<u32> {
    let lower = abbrev.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .and_then(|idx| u32::try_from(idx + 1).ok())
}
