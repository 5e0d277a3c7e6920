//! Criterion micro-benchmarks for the linked list.

use std::ops::ControlFlow;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mpool_list::List;

fn filled(n: u64) -> List<u64> {
    let mut list = List::new();
    for i in 0..n {
        list.append(i).unwrap();
    }
    list
}

/// Benchmark: append 10K items to an empty list.
fn bench_append_10k(c: &mut Criterion) {
    c.bench_function("list_append_10k", |b| {
        b.iter(|| black_box(filled(10_000)));
    });
}

/// Benchmark: remove the middle node and put it back.
fn bench_remove_reinsert(c: &mut Criterion) {
    let mut list = filled(10_000);
    let mut mid = list.first().unwrap();
    for _ in 0..5_000 {
        mid = list.next(mid).unwrap();
    }
    c.bench_function("list_remove_reinsert", |b| {
        b.iter(|| {
            let prev = list.prev(mid);
            let value = list.remove(mid).unwrap();
            mid = list.insert_after(prev, black_box(value)).unwrap();
        });
    });
}

/// Benchmark: visitor walk over 10K items versus the borrowing iterator.
fn bench_walk_10k(c: &mut Criterion) {
    let list = filled(10_000);
    c.bench_function("list_iterate_10k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            list.iterate(None, None, |_, &v| {
                sum += v;
                ControlFlow::Continue(())
            })
            .unwrap();
            black_box(sum)
        });
    });
    c.bench_function("list_iter_10k", |b| {
        b.iter(|| black_box(list.iter().map(|(_, &v)| v).sum::<u64>()));
    });
}

criterion_group!(benches, bench_append_10k, bench_remove_reinsert, bench_walk_10k);
criterion_main!(benches);
