//! CEF (Common Event Format) 파서
//!
//! # 메시지 형식
//! ```text
//! [syslog prefix] CEF:Version|Vendor|Product|DevVersion|SignatureID|Name|Severity|Extension
//! ```
//!
//! - 헤더 필드는 `|`로 구분되며 `\|`, `\\` 이스케이프를 허용합니다.
//! - Extension은 공백으로 구분된 `key=value` 쌍이며, 값은 다음 ` key=` 직전까지입니다.
//!   값 안에서는 `\=`, `\\`, `\n`, `\r` 이스케이프를 허용합니다.
//!
//! # 필드 매핑
//! | CEF | 레코드 |
//! |-----|--------|
//! | `src` | host (없으면 `"unknown"`) |
//! | `Name` + `msg` | message (`"CEF Event: {Name} msg={msg}"`) |
//! | `rt` | timestamp (없으면 수신 시각) |
//! | `sev` | severity |
//! | `usr`, `user` | user |
//! | `dvc` | device |
//! | `msgid` | message_id |

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use logharbor_core::pipeline::{LogParser, ParseOutcome};
use logharbor_core::types::{FormatType, ParsedFields};

/// CEF 시작 마커
pub const CEF_MARKER: &str = "CEF:";

/// 헤더 필드 수 (Version ~ Severity)
const HEADER_FIELDS: usize = 7;

/// `src`가 없을 때의 호스트
const UNKNOWN_HOST: &str = "unknown";

/// Extension 키 시작 위치: 문자열 시작 또는 공백 뒤의 `key=`
static EXTENSION_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)([A-Za-z0-9_.\[\]-]+)=").ok());

/// CEF 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct CefParser;

impl CefParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for CefParser {
    fn format(&self) -> FormatType {
        FormatType::Cef
    }

    fn parse(&self, text: &str) -> ParseOutcome {
        let Some(start) = text.find(CEF_MARKER) else {
            return ParseOutcome::NoMatch;
        };
        let body = &text[start..];

        let (header, extension) = split_header(body);
        if header.len() < HEADER_FIELDS {
            return ParseOutcome::Failed(format!(
                "truncated header: {} of {} fields",
                header.len(),
                HEADER_FIELDS
            ));
        }

        let Some(pairs) = parse_extension(extension) else {
            return ParseOutcome::Failed("extension pattern unavailable".to_owned());
        };

        let name = &header[5];
        let mut fields = ParsedFields::default();
        let mut msg = None;
        let mut usr = None;
        let mut user = None;

        for (key, value) in pairs {
            match key {
                "src" => fields.host = Some(value),
                "msg" => msg = Some(value),
                "rt" => fields.timestamp = Some(normalize_receipt_time(&value)),
                "sev" => fields.severity = Some(value),
                "usr" => usr = Some(value),
                "user" => user = Some(value),
                "dvc" => fields.device = Some(value),
                "msgid" => fields.message_id = Some(value),
                _ => {}
            }
        }

        fields.host.get_or_insert_with(|| UNKNOWN_HOST.to_owned());
        fields.user = usr.filter(|u| !u.is_empty()).or(user);
        fields.message = Some(format!(
            "CEF Event: {} msg={}",
            name,
            msg.unwrap_or_default()
        ));

        ParseOutcome::Matched(fields)
    }
}

/// 헤더를 최대 7개 필드로 나누고 나머지를 extension으로 반환합니다.
fn split_header(body: &str) -> (Vec<String>, &str) {
    let mut fields = Vec::with_capacity(HEADER_FIELDS);
    let mut current = String::new();
    let mut chars = body.char_indices();

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => match chars.clone().next() {
                Some((_, next @ ('|' | '\\'))) => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(c),
            },
            '|' => {
                fields.push(std::mem::take(&mut current));
                if fields.len() == HEADER_FIELDS {
                    return (fields, &body[idx + 1..]);
                }
            }
            _ => current.push(c),
        }
    }

    fields.push(current);
    (fields, "")
}

/// Extension을 `(key, value)` 목록으로 분해합니다.
///
/// 패턴을 사용할 수 없으면 `None`을 반환합니다.
fn parse_extension(extension: &str) -> Option<Vec<(&str, String)>> {
    let re = EXTENSION_KEY.as_ref()?;

    let keys: Vec<(usize, usize, &str)> = re
        .captures_iter(extension)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?;
            Some((whole.start(), whole.end(), key.as_str()))
        })
        .collect();

    let pairs = keys
        .iter()
        .enumerate()
        .map(|(i, &(_, value_start, key))| {
            let value_end = keys.get(i + 1).map_or(extension.len(), |next| next.0);
            let value = extension[value_start..value_end].trim_end();
            (key, unescape_value(value))
        })
        .collect();

    Some(pairs)
}

fn unescape_value(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_owned();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('=') => out.push('='),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            _ => {
                out.push('\\');
                continue;
            }
        }
        chars.next();
    }
    out
}

/// `rt` 값을 ISO-8601로 정규화합니다.
///
/// epoch 밀리초, RFC 3339, `MMM dd yyyy HH:mm:ss`(UTC) 형식을 인식하며,
/// 그 외의 값은 그대로 유지합니다.
fn normalize_receipt_time(rt: &str) -> String {
    if !rt.is_empty() && rt.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(dt) = rt
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        {
            return dt.to_rfc3339();
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(rt) {
        return dt.to_rfc3339();
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(rt, "%b %d %Y %H:%M:%S") {
        return Utc.from_utc_datetime(&naive).to_rfc3339();
    }

    rt.to_owned()
}
