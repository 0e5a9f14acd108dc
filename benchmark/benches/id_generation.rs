// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Identifier generation microbenchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reportbin_core::{IdGenerator, RandomIdGenerator, ReportId};

fn bench_generate(c: &mut Criterion) {
    let gen = RandomIdGenerator;
    c.bench_function("id_generate", |b| b.iter(|| black_box(gen.generate())));
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("id_parse", |b| {
        b.iter(|| black_box(ReportId::parse(black_box("k3j9x0qa"))))
    });
}

criterion_group!(benches, bench_generate, bench_parse);
criterion_main!(benches);
