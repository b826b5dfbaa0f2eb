//! 형식 디스패처 벤치마크
//!
//! 인코딩 정규화와 형식별 분류 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logharbor_log_pipeline::encoding;
use logharbor_log_pipeline::parser::FormatDispatcher;

const PEER: &str = "192.0.2.1";
const NOW: &str = "2026-01-05T12:00:00+00:00";

/// 형식별 대표 메시지
const SAMPLES: &[(&str, &str)] = &[
    (
        "cef",
        "CEF:0|Security|threatmanager|1.0|100|worm successfully stopped|10|src=10.0.0.1 dst=2.1.2.2 spt=1232 rt=1767614400000 suser=alice msg=Detected a threat. No action needed",
    ),
    (
        "leef",
        "LEEF:1.0\tVendor\tProduct\t1.0\tEventID\tsrc=10.0.0.1\tsev=5\tusr=bob\tdvc=fw01\tmsg=test",
    ),
    (
        "rfc5424",
        "<165>1 2026-01-05T12:00:00Z testhost app 12345 ID1 - Hello",
    ),
    ("bsd", "<34>Oct 11 22:14:15 mymachine su: failed login"),
    ("unknown", "plain text message from an unconfigured device"),
];

/// CP1252 인코딩된 "café" 메시지
const LATIN1_BYTES: &[u8] = b"<34>Oct 11 22:14:15 host caf\xe9 ouvert";

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = FormatDispatcher::new();
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    for (name, text) in SAMPLES {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, text| {
            b.iter(|| dispatcher.dispatch(black_box(text), PEER, NOW))
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(1));

    group.bench_function("utf8", |b| {
        b.iter(|| encoding::normalize(black_box(SAMPLES[2].1.as_bytes())))
    });
    group.bench_function("legacy_single_byte", |b| {
        b.iter(|| encoding::normalize(black_box(LATIN1_BYTES)))
    });

    group.finish();
}

fn bench_throughput(c: &mut Criterion) {
    let dispatcher = FormatDispatcher::new();
    let mut group = c.benchmark_group("mixed_throughput");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("1000_messages", |b| {
        b.iter(|| {
            for i in 0..1000 {
                let (_, text) = SAMPLES[i % SAMPLES.len()];
                let normalized = encoding::normalize(black_box(text.as_bytes()));
                black_box(dispatcher.dispatch(&normalized, PEER, NOW));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_normalize, bench_throughput);
criterion_main!(benches);
