// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

use criterion::*;
use ndarray::Array1;
use pre_key_recovery::primitive::gadget::encode;

/// Benchmark [encode] of a secret of length `m = 256` with `k = 10` and `k = 32`.
///
/// This benchmark can be run with for example:
/// - `cargo criterion P2`
/// - `cargo bench --bench benchmarks P2\ k=32`
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("P2");
    let secret: Array1<i64> = (0..256).map(|i| i * 7 - 900).collect();

    for k in [10, 32] {
        let q = 1i64 << k;
        group.bench_function(format!("k={k}"), |b| {
            b.iter(|| encode(black_box(&secret), q, k).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode);
