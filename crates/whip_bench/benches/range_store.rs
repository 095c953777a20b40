//! Range store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use whip_bench::utils::{disjoint_ranges, random_addresses, sample_record};
use whip_core::{Config, RangeStore};

fn loaded_store(count: u32) -> RangeStore {
    let mut store = RangeStore::open_in_memory_with_config(Config::default().sync_on_commit(false))
        .unwrap();
    store
        .load(
            disjoint_ranges(count, 256)
                .into_iter()
                .enumerate()
                .map(|(i, r)| (r, sample_record(i as u32))),
        )
        .unwrap();
    store
}

/// Benchmark bulk loads.
fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    group.sample_size(20);

    for count in [1_000u32, 10_000, 50_000].iter() {
        group.throughput(Throughput::Elements(u64::from(*count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let records: Vec<_> = disjoint_ranges(count, 256)
                .into_iter()
                .enumerate()
                .map(|(i, r)| (r, sample_record(i as u32)))
                .collect();

            b.iter(|| {
                let mut store = RangeStore::open_in_memory_with_config(
                    Config::default().sync_on_commit(false),
                )
                .unwrap();
                store.load(black_box(records.clone())).unwrap();
                black_box(store.len());
            });
        });
    }
    group.finish();
}

/// Benchmark point lookups at random addresses.
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in [1_000u32, 100_000].iter() {
        let store = loaded_store(*count);
        let addresses = random_addresses(1_000, count * 257);

        group.throughput(Throughput::Elements(addresses.len() as u64));
        group.bench_with_input(BenchmarkId::new("record", count), &addresses, |b, addresses| {
            b.iter(|| {
                for &address in addresses {
                    black_box(store.lookup(black_box(address)).unwrap());
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("raw", count), &addresses, |b, addresses| {
            b.iter(|| {
                for &address in addresses {
                    black_box(store.lookup_raw(black_box(address)).unwrap());
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_load, bench_lookup);
criterion_main!(benches);
