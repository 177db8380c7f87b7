// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::future::ready;
use core::ops::ControlFlow;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use futures::executor::block_on;
use understory_collection::Collection;
use understory_iterate::clock::ManualClock;
use understory_iterate::pipeline::{Element, async_map};
use understory_iterate::{Chunked, parallel_map, serial_map};

const SIZES: &[usize] = &[1_000, 10_000, 100_000];

fn gen_sequence(n: usize) -> Collection<u64> {
    (0..n as u64).collect()
}

fn gen_mapping(n: usize) -> Collection<u64> {
    Collection::mapping((0..n as u64).map(|i| (format!("k{i}"), i)))
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_map");
    for &n in SIZES {
        let seq = gen_sequence(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("sequence_n{n}"), |b| {
            b.iter(|| {
                let out = block_on(parallel_map(&seq, |item| ready(item.value + 1)));
                black_box(out.len());
            });
        });
    }
    let map = gen_mapping(10_000);
    group.bench_function("mapping_n10000", |b| {
        b.iter(|| {
            let out = block_on(parallel_map(&map, |item| ready(item.value + 1)));
            black_box(out.len());
        });
    });
    group.finish();
}

fn bench_serial(c: &mut Criterion) {
    let mut group = c.benchmark_group("serial_map");
    for &n in SIZES {
        let seq = gen_sequence(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("sequence_n{n}"), |b| {
            b.iter(|| {
                let out = block_on(serial_map(&seq, |item| {
                    ready(ControlFlow::Continue(item.value + 1))
                }));
                black_box(out.len());
            });
        });
    }
    group.finish();
}

fn bench_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunked_map");
    for &n in SIZES {
        let seq = gen_sequence(n);
        group.throughput(Throughput::Elements(n as u64));
        // A clock that never advances: measures the per-element overhead without suspensions.
        group.bench_function(format!("no_yield_n{n}"), |b| {
            let chunked = Chunked::with_clock(ManualClock::new());
            b.iter(|| {
                let out = block_on(chunked.map(&seq, |item| ControlFlow::Continue(item.value + 1)));
                black_box(out.len());
            });
        });
        group.bench_function(format!("system_clock_n{n}"), |b| {
            let chunked = Chunked::new();
            b.iter(|| {
                let out = block_on(chunked.map(&seq, |item| ControlFlow::Continue(item.value + 1)));
                black_box(out.len());
            });
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for &stages in &[10usize, 100] {
        let width = 100;
        group.throughput(Throughput::Elements((stages * width) as u64));
        group.bench_function(format!("stages{stages}_width{width}"), |b| {
            b.iter_batched(
                || {
                    Collection::sequence(
                        (0..stages).map(|_| Element::Batch(gen_sequence(width))),
                    )
                },
                |plan| {
                    let out = block_on(async_map(plan, |item| ready(item.value + 1)));
                    black_box(out.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parallel,
    bench_serial,
    bench_chunked,
    bench_pipeline,
);
criterion_main!(benches);
