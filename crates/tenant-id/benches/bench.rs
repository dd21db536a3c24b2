use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use tenant_id::{CredentialGenerator, Sequencer, SidGenerator, SystemClock, TimeSource};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of values generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

fn bench_sequencer(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequencer");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        let sequencer = Sequencer::new();
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(sequencer.next());
            }
        });
    });

    group.finish();
}

fn bench_sequencer_threaded(c: &mut Criterion, thread_counts: &[usize]) {
    let mut group = c.benchmark_group("sequencer/threaded");

    for &threads in thread_counts {
        group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));
        group.bench_function(format!("threads/{threads}"), |b| {
            b.iter_custom(|iters| {
                let sequencer = Arc::new(Sequencer::new());
                let barrier = Arc::new(Barrier::new(threads + 1));
                let mut start = Instant::now();

                scope(|s| {
                    for _ in 0..threads {
                        let sequencer = Arc::clone(&sequencer);
                        let barrier = Arc::clone(&barrier);
                        s.spawn(move || {
                            barrier.wait();
                            for _ in 0..iters {
                                for _ in 0..TOTAL_IDS {
                                    black_box(sequencer.next());
                                }
                            }
                        });
                    }
                    barrier.wait();
                    start = Instant::now();
                });

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn bench_sid(c: &mut Criterion) {
    let mut group = c.benchmark_group("sid");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("mock/elems/{TOTAL_IDS}"), |b| {
        let generator = SidGenerator::new(FixedMockTime { millis: 42 });
        generator
            .init("BJ", "192.168.1.100", "8080")
            .expect("valid config");
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.new_sid("tst").expect("initialized"));
            }
        });
    });

    group.bench_function(format!("system/elems/{TOTAL_IDS}"), |b| {
        let generator = SidGenerator::new(SystemClock);
        generator
            .init("BJ", "192.168.1.100", "8080")
            .expect("valid config");
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.new_sid("tst").expect("initialized"));
            }
        });
    });

    group.finish();
}

fn bench_credentials(c: &mut Criterion) {
    let mut group = c.benchmark_group("credentials");
    let generator: CredentialGenerator = CredentialGenerator::default();

    group.bench_function("app_id/32", |b| b.iter(|| black_box(generator.app_id(32))));
    group.bench_function("api_key", |b| {
        b.iter(|| black_box(generator.api_key("bench-app")));
    });
    group.bench_function("api_secret", |b| b.iter(|| black_box(generator.api_secret())));

    group.finish();
}

fn benchmarks(c: &mut Criterion) {
    bench_sequencer(c);
    bench_sequencer_threaded(c, &[1, 2, 4, 8]);
    bench_sid(c);
    bench_credentials(c);
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
