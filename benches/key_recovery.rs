// Copyright © 2025 The pre-key-recovery authors
//
// This file is part of pre-key-recovery.
//
// pre-key-recovery is free software: you can redistribute it and/or modify it under
// the terms of the Mozilla Public License Version 2.0 as published by the
// Mozilla Foundation. See <https://mozilla.org/en-US/MPL/2.0/>.

use criterion::*;
use ndarray::Array2;
use pre_key_recovery::{
    attack::{experiment::KeyRecoveryExperiment, key_recovery::recover_all},
    construction::proxy_reencryption::{GadgetPre, PreParameters, ProxyReEncryption},
    sample::distribution::DiscreteGauss,
};

/// Generates the result of combining a re-encryption key with the recipient's
/// secret for an instance with `n = 4`, `m` and `k`.
fn leaked_result(m: usize, k: usize) -> Array2<i64> {
    let params = PreParameters::new(4, m, k, Box::new(DiscreteGauss::default())).unwrap();
    let pre = GadgetPre::new(params).unwrap();

    let sk_a = pre.gen_secret_key().unwrap();
    let sk_b = pre.gen_secret_key().unwrap();
    let pk_b = pre.gen_public_key(&sk_b).unwrap();
    let rk = pre.gen_rk(&pk_b, &sk_a).unwrap();
    pre.decrypt_rk(&rk, &sk_b).unwrap()
}

/// Benchmark [recover_all] with `k = 16` and `m = 8, 64, 512`.
///
/// This benchmark can be run with for example:
/// - `cargo criterion "Recover\ all"`
/// - `cargo criterion Recover\ all/m=64` (only run the m=64 benchmark).
/// - `cargo bench --bench benchmarks Recover\ all`
fn bench_recover_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("Recover all");

    for m in [8, 64, 512] {
        let res = leaked_result(m, 16);
        group.bench_function(format!("m={m}"), |b| {
            b.iter(|| recover_all(black_box(&res), 1 << 16).unwrap())
        });
    }

    group.finish();
}

/// Benchmark a full attack with the default parameters, i.e. key generation,
/// re-encryption key generation and recovery.
///
/// This benchmark can be run with for example:
/// - `cargo criterion Attack\ default`
fn bench_attack_cycle(c: &mut Criterion) {
    let experiment = KeyRecoveryExperiment::new(PreParameters::init_default()).unwrap();

    c.bench_function("Attack default", |b| {
        b.iter(|| experiment.run_fresh().unwrap())
    });
}

criterion_group!(benches, bench_recover_all, bench_attack_cycle);
