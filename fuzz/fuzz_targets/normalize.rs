#![no_main]

use logharbor_log_pipeline::encoding;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = encoding::normalize(data);
    assert_eq!(encoding::normalize_str(&text), text);
});
