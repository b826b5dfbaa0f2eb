//! 인코딩 정규화 -- 임의의 바이트열을 정규 텍스트로 변환
//!
//! 1. 유효한 UTF-8이면 감지를 건너뜁니다. 수신 버퍼 상한에서 잘려 끝의 문자 하나만
//!    불완전한 UTF-8도 UTF-8로 보고, 잘린 문자만 버립니다.
//! 2. 그렇지 않으면 `chardetng`로 문자셋을 추정하고 `encoding_rs`로 디코딩합니다.
//!    디코딩할 수 없는 바이트는 버립니다 (대체 문자를 남기지 않음).
//! 3. 앞뒤의 NUL, 개행, 캐리지 리턴, 탭, 공백을 제거합니다.
//!
//! 어떤 입력에도 실패하지 않으며 블로킹하지 않습니다.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// 앞뒤에서 제거할 문자
const TRIM_CHARS: [char; 5] = ['\0', '\n', '\r', '\t', ' '];

/// 바이트열을 정규화된 텍스트로 변환합니다.
pub fn normalize(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => normalize_str(text).to_owned(),
        Err(e) if e.error_len().is_none() => {
            let valid = &bytes[..e.valid_up_to()];
            // valid_up_to까지는 검증된 UTF-8
            let text = std::str::from_utf8(valid).unwrap_or_default();
            normalize_str(text).to_owned()
        }
        Err(_) => {
            let encoding = detect(bytes);
            let decoded = decode_lossy(encoding, bytes);
            normalize_str(&decoded).to_owned()
        }
    }
}

/// 이미 텍스트인 입력에서 앞뒤 제어 문자만 제거합니다.
pub fn normalize_str(text: &str) -> &str {
    text.trim_matches(&TRIM_CHARS[..])
}

/// 통계적 문자셋 감지. 추정할 근거가 없으면 UTF-8을 반환합니다.
fn detect(bytes: &[u8]) -> &'static Encoding {
    if bytes.is_empty() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// 지정한 인코딩으로 디코딩하고, 디코딩 불가 구간은 제거합니다.
fn decode_lossy(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (decoded, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::trace!(
            encoding = encoding.name(),
            len = bytes.len(),
            "dropping undecodable bytes"
        );
        decoded.chars().filter(|&c| c != '\u{FFFD}').collect()
    } else {
        decoded.into_owned()
    }
}
