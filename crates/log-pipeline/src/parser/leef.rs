//! LEEF (Log Event Extended Format) 파서
//!
//! ```text
//! LEEF:1.0\tVendor\tProduct\t1.0\tEventID\tsrc=10.0.0.1\tsev=5\tmsg=test
//! LEEF:1.0|Vendor|Product|1.0|EventID|src=10.0.0.1\tsev=5
//! ```
//!
//! 탭으로 분리한 첫 세그먼트는 헤더이고, 나머지는 `key=value` 속성입니다.
//! 첫 번째 `=`만 구분자이며 값에는 `=`가 포함될 수 있습니다.
//! 헤더가 `|`로 구분된 경우 다섯 번째 `|` 이후 텍스트를 첫 속성으로 취급합니다.
//! 인식하지 못한 키는 무시합니다.

use logharbor_core::pipeline::{LogParser, ParseOutcome};
use logharbor_core::types::{FormatType, ParsedFields};

/// LEEF 시작 마커
pub const LEEF_MARKER: &str = "LEEF:";

/// `|` 헤더에서 속성이 시작되기 전 구분자 수
const PIPE_HEADER_FIELDS: usize = 5;

/// LEEF 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct LeefParser;

impl LeefParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for LeefParser {
    fn format(&self) -> FormatType {
        FormatType::Leef
    }

    fn parse(&self, text: &str) -> ParseOutcome {
        if !text.starts_with(LEEF_MARKER) {
            return ParseOutcome::NoMatch;
        }

        let mut segments = text.split('\t');
        let header = segments.next().unwrap_or_default();
        let inline = pipe_header_attribute(header);

        let mut fields = ParsedFields {
            host: Some("unknown".to_owned()),
            message: Some(text.to_owned()),
            ..Default::default()
        };
        let mut usr = None;
        let mut user = None;

        for segment in inline.into_iter().chain(segments) {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let value = value.trim().to_owned();
            match key.trim().to_ascii_lowercase().as_str() {
                "src" => fields.host = Some(value),
                "msg" => fields.message = Some(value),
                "sev" => fields.severity = Some(value),
                "usr" => usr = Some(value),
                "user" => user = Some(value),
                "dvc" => fields.device = Some(value),
                "msgid" => fields.message_id = Some(value),
                _ => {}
            }
        }

        fields.user = usr.filter(|u| !u.is_empty()).or(user);
        ParseOutcome::Matched(fields)
    }
}

/// `LEEF:1.0|V|P|Ver|EventID|attr` 헤더에서 `attr` 부분을 돌려줍니다.
fn pipe_header_attribute(header: &str) -> Option<&str> {
    let (idx, _) = header.match_indices('|').nth(PIPE_HEADER_FIELDS - 1)?;
    let rest = &header[idx + 1..];
    (!rest.is_empty()).then_some(rest)
}
