//! Lookup cost for small node sets, with UUID shaped keys.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rendezvous_hash::{Rendezvous, Xxh3};
use std::hint::black_box;

const SAMPLE_KEYS: [&str; 5] = [
    "352DAB08-C1FD-4462-B573-7640B730B721",
    "382080D3-B847-4BB5-AEA8-644C3E56F4E1",
    "2B340C12-7958-4DBE-952C-67496E15D0C8",
    "BE05F82B-902E-4868-8CC9-EE50A6C64636",
    "C7ECC571-E924-4523-A313-951DFD5D8073",
];

const NODES: [&str; 10] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for count in [5, 10] {
        let rendezvous: Rendezvous<&str> = NODES[..count].iter().copied().collect();
        group.bench_with_input(BenchmarkId::new("castagnoli", count), &rendezvous, |b, r| {
            let mut i = 0;
            b.iter(|| {
                i += 1;
                black_box(r.get(SAMPLE_KEYS[i % SAMPLE_KEYS.len()]));
            })
        });

        let mut rendezvous = Rendezvous::with_scorer(Xxh3);
        rendezvous.add(NODES[..count].iter().copied());
        group.bench_with_input(BenchmarkId::new("xxh3", count), &rendezvous, |b, r| {
            let mut i = 0;
            b.iter(|| {
                i += 1;
                black_box(r.get(SAMPLE_KEYS[i % SAMPLE_KEYS.len()]));
            })
        });
    }

    group.finish();
}

fn bench_get_n(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_n");

    for count in [5, 10] {
        for n in [3, 5] {
            let id = format!("{}_of_{}", n, count);
            let mut rendezvous: Rendezvous<&str> = NODES[..count].iter().copied().collect();

            group.bench_function(BenchmarkId::new("in_place", &id), |b| {
                let mut i = 0;
                b.iter(|| {
                    i += 1;
                    black_box(rendezvous.get_n(n, SAMPLE_KEYS[i % SAMPLE_KEYS.len()]).len());
                })
            });

            group.bench_function(BenchmarkId::new("ranked", &id), |b| {
                let mut i = 0;
                b.iter(|| {
                    i += 1;
                    black_box(rendezvous.ranked(n, SAMPLE_KEYS[i % SAMPLE_KEYS.len()]).len());
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_get, bench_get_n);
criterion_main!(benches);
