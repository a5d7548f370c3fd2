//! Criterion micro-benchmarks for pool insert/erase cycling, reads, and scans.

use std::thread;
use std::time::Instant;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slotpool::SlotPool;
use slotpool_bench::filled_pool;

fn bench_insert_erase_cycle(c: &mut Criterion) {
    let pool = filled_pool(1024, 512);
    c.bench_function("insert_erase_cycle_cap_1024", |b| {
        b.iter(|| {
            let index = pool.insert(black_box(7u64)).expect("pool has room");
            pool.erase(black_box(index));
        })
    });
}

fn bench_get_hit(c: &mut Criterion) {
    let pool = filled_pool(1024, 1024);
    let mut index = 0usize;
    c.bench_function("get_hit_cap_1024", |b| {
        b.iter(|| {
            index = (index + 1) % pool.capacity();
            black_box(pool.get(black_box(index)))
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    let pool = filled_pool(1024, 512);
    c.bench_function("get_miss_cap_1024", |b| {
        // Index 1000 sits in the never-occupied tail.
        b.iter(|| black_box(pool.get(black_box(1000))))
    });
}

fn bench_len_scan(c: &mut Criterion) {
    let pool = filled_pool(1024, 512);
    c.bench_function("len_scan_cap_1024", |b| b.iter(|| black_box(pool.len())));
}

fn bench_find_last(c: &mut Criterion) {
    let pool = filled_pool(1024, 1024);
    let needle = 1023u64;
    c.bench_function("find_last_cap_1024", |b| {
        b.iter(|| black_box(pool.find(black_box(&needle))))
    });
}

fn bench_for_each_scan(c: &mut Criterion) {
    let pool = filled_pool(1024, 512);
    c.bench_function("for_each_scan_cap_1024", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            pool.for_each(|_, value| sum = sum.wrapping_add(value));
            black_box(sum)
        })
    });
}

fn bench_contended_churn(c: &mut Criterion) {
    c.bench_function("churn_4_threads_cap_64", |b| {
        b.iter_custom(|iters| {
            let pool = SlotPool::new(64).expect("benchmark capacity");
            let start = Instant::now();
            thread::scope(|scope| {
                for t in 0..4u64 {
                    let pool = &pool;
                    scope.spawn(move || {
                        for k in 0..iters {
                            if let Some(index) = pool.insert(t ^ k) {
                                pool.erase(index);
                            }
                        }
                    });
                }
            });
            start.elapsed()
        })
    });
}

criterion_group!(
    benches,
    bench_insert_erase_cycle,
    bench_get_hit,
    bench_get_miss,
    bench_len_scan,
    bench_find_last,
    bench_for_each_scan,
    bench_contended_churn,
);
criterion_main!(benches);
