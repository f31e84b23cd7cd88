//! Benchmarks for stage position resolution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gateflow::stages::{resolve_status, stage_overview, StageKey};

fn stage_benchmark(c: &mut Criterion) {
    c.bench_function("resolve_status", |b| {
        b.iter(|| resolve_status(black_box("mapping"), black_box("uat")))
    });

    c.bench_function("stage_overview", |b| {
        b.iter(|| stage_overview(black_box(StageKey::Build)))
    });
}

criterion_group!(benches, stage_benchmark);
criterion_main!(benches);
