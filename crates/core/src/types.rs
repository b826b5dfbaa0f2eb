//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 수집기, 파서, 저장소, 라이브 피드가 공유하는 레코드 구조를 정의합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 로그 형식 분류
///
/// 직렬화/표시 형식은 저장소 `format_type` 컬럼 값과 동일합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatType {
    /// ArcSight Common Event Format
    Cef,
    /// IBM QRadar Log Event Extended Format
    Leef,
    /// RFC 5424 syslog
    SyslogRfc5424,
    /// RFC 3164 (BSD) syslog
    SyslogBsd,
    /// 어떤 문법에도 맞지 않는 원문
    Unknown,
}

impl FormatType {
    /// 저장/표시용 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cef => "CEF",
            Self::Leef => "LEEF",
            Self::SyslogRfc5424 => "SYSLOG_RFC5424",
            Self::SyslogBsd => "SYSLOG_BSD",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CEF" => Ok(Self::Cef),
            "LEEF" => Ok(Self::Leef),
            "SYSLOG_RFC5424" => Ok(Self::SyslogRfc5424),
            "SYSLOG_BSD" => Ok(Self::SyslogBsd),
            "UNKNOWN" => Ok(Self::Unknown),
            other => Err(format!("unknown format type: {other}")),
        }
    }
}

/// 파서가 추출한 필드
///
/// 파서는 자신이 인식한 키만 채우고, 나머지는 `None`으로 둡니다.
/// 비어 있는 `host`/`timestamp`는 디스패처가 피어 주소와 수신 시각으로 채웁니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub timestamp: Option<String>,
    pub host: Option<String>,
    pub message: Option<String>,
    pub severity: Option<String>,
    pub user: Option<String>,
    pub device: Option<String>,
    pub message_id: Option<String>,
}

/// 정규화된 로그 레코드
///
/// 수신된 네트워크 메시지 하나당 한 번 생성되며, 생성 이후에는 변경되지 않습니다.
/// 저장 단계는 행 ID만 덧붙입니다([`StoredRecord`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 시각 (파서 제공 값 또는 수신 시각)
    pub timestamp: String,
    /// 발신 장비 식별자 (없으면 피어 주소)
    pub host: String,
    /// 사람이 읽을 수 있는 메시지
    pub message: String,
    /// 분류된 형식
    pub format_type: FormatType,
    /// 디코딩만 거친 원문
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl LogRecord {
    /// 파서 결과와 기본값으로 레코드를 조립합니다.
    ///
    /// `host`/`timestamp`가 비어 있으면 `fallback_host`/`accepted_at`을 사용하고,
    /// `message`가 비어 있으면 원문 전체를 사용합니다.
    pub fn assemble(
        format_type: FormatType,
        fields: ParsedFields,
        raw: impl Into<String>,
        fallback_host: &str,
        accepted_at: &str,
    ) -> Self {
        let raw = raw.into();
        Self {
            timestamp: fields.timestamp.unwrap_or_else(|| accepted_at.to_owned()),
            host: fields.host.unwrap_or_else(|| fallback_host.to_owned()),
            message: fields.message.unwrap_or_else(|| raw.clone()),
            format_type,
            raw,
            severity: fields.severity,
            user: fields.user,
            device: fields.device,
            message_id: fields.message_id,
        }
    }

    /// 어떤 문법에도 맞지 않은 원문으로 `UNKNOWN` 레코드를 만듭니다.
    pub fn unknown(raw: impl Into<String>, peer_host: &str, accepted_at: &str) -> Self {
        Self::assemble(
            FormatType::Unknown,
            ParsedFields::default(),
            raw,
            peer_host,
            accepted_at,
        )
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.format_type, self.timestamp, self.host, self.message
        )
    }
}

/// 저장소에 기록된 레코드
///
/// `id`는 자동 증가 식별자로, 보존 정책(가장 오래된 ID부터 삭제)과
/// 조회 순서(ID 내림차순)에만 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: LogRecord,
}
