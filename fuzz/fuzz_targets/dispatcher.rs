#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use logharbor_core::types::FormatType;
use logharbor_log_pipeline::encoding;
use logharbor_log_pipeline::parser::FormatDispatcher;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    payload: &'a [u8],
    prefix: Prefix,
}

/// 각 파서 분기로 유도하기 위한 접두사
#[derive(Debug, Arbitrary)]
enum Prefix {
    None,
    Cef,
    Leef,
    Pri,
}

fuzz_target!(|input: Input<'_>| {
    let mut bytes = match input.prefix {
        Prefix::None => Vec::new(),
        Prefix::Cef => b"CEF:0|".to_vec(),
        Prefix::Leef => b"LEEF:1.0\t".to_vec(),
        Prefix::Pri => b"<13>".to_vec(),
    };
    bytes.extend_from_slice(input.payload);

    let text = encoding::normalize(&bytes);
    let record = FormatDispatcher::new().dispatch(&text, "192.0.2.1", "2026-01-01T00:00:00+00:00");

    assert_eq!(record.raw, text);
    if record.format_type == FormatType::Unknown {
        assert_eq!(record.message, record.raw);
    }
});
