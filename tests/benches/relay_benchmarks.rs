//! # Latency-Relay Benchmarks
//!
//! | Component | Path | Target |
//! |-----------|------|--------|
//! | shared-types | Envelope encode + decode | < 5µs |
//! | lr-03 Latency Store | In-memory append (pair + result) | < 10µs |
//! | lr-03 Latency Store | Contended append, 4 threads | no lost rows |

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lr_03_latency_store::{InMemoryLatencyStore, LatencyStore};
use shared_types::Envelope;

fn bench_envelope_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-types-envelope");

    let mut stamped = Envelope::new(1_700_000_000_000);
    stamped.stamp_received(1_700_000_000_050).unwrap();
    let payload = Envelope::new(1_700_000_000_000).encode().unwrap();

    group.bench_function("encode", |b| b.iter(|| black_box(stamped.encode().unwrap())));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(Envelope::decode(black_box(&payload)).unwrap()))
    });

    group.finish();
}

fn bench_store_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("lr-03-latency-store");
    group.measurement_time(Duration::from_secs(5));

    let store = InMemoryLatencyStore::in_memory();
    let mut sender_ts = 0u64;
    group.bench_function("append_single", |b| {
        b.iter(|| {
            sender_ts += 1;
            black_box(store.append(sender_ts, sender_ts + 50).unwrap())
        })
    });

    for threads in [2usize, 4] {
        let per_thread = 1_000u64;
        group.throughput(Throughput::Elements(threads as u64 * per_thread));
        group.bench_with_input(
            BenchmarkId::new("append_contended", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    let store = Arc::new(InMemoryLatencyStore::in_memory());
                    let handles: Vec<_> = (0..threads)
                        .map(|t| {
                            let store = Arc::clone(&store);
                            thread::spawn(move || {
                                for i in 0..per_thread {
                                    let ts = t as u64 * per_thread + i;
                                    store.append(ts, ts + 50).unwrap();
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                    assert_eq!(store.backend().result_count() as u64, threads as u64 * per_thread);
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_envelope_codec, bench_store_append);
criterion_main!(benches);
