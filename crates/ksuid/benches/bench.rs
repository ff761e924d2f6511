use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ksuid::{
    ENCODED_LEN, Ksuid, KsuidGenerator, OsRandom, PAYLOAD_LEN, RandSource, Result, ThreadRandom,
    TimeSource, sort,
};

struct FixedMockTime {
    seconds: u64,
}

impl TimeSource for FixedMockTime {
    fn current_seconds(&self) -> u64 {
        self.seconds
    }
}

struct FixedMockRand;

impl RandSource for FixedMockRand {
    fn try_payload(&self) -> Result<[u8; PAYLOAD_LEN]> {
        Ok([0xA5; PAYLOAD_LEN])
    }
}

// Number of IDs handled per benchmark iteration.
const TOTAL_IDS: usize = 4096;

fn sample_ids() -> Vec<Ksuid> {
    let generator = KsuidGenerator::new(
        FixedMockTime {
            seconds: 1_700_000_000,
        },
        ThreadRandom,
    );
    (0..TOTAL_IDS)
        .map(|_| generator.generate().unwrap())
        .collect()
}

/// Benchmarks generation with each random source; the mock isolates the cost
/// of assembling the ID from the cost of drawing entropy.
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let time = FixedMockTime {
        seconds: 1_700_000_000,
    };
    let mock = KsuidGenerator::new(&time, FixedMockRand);
    let thread = KsuidGenerator::new(&time, ThreadRandom);
    let os = KsuidGenerator::new(&time, OsRandom);

    group.bench_function(format!("mock/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(mock.generate().unwrap());
            }
        });
    });
    group.bench_function(format!("thread_random/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(thread.generate().unwrap());
            }
        });
    });
    group.bench_function(format!("os_random/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(os.generate().unwrap());
            }
        });
    });

    group.finish();
}

fn bench_base62(c: &mut Criterion) {
    let ids = sample_ids();
    let encoded: Vec<_> = ids.iter().map(Ksuid::encode).collect();

    let mut group = c.benchmark_group("base62");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("encode/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for id in &ids {
                black_box(id.encode());
            }
        });
    });
    group.bench_function(format!("encode_to_buf/elems/{TOTAL_IDS}"), |b| {
        let mut buf = [0_u8; ENCODED_LEN];
        b.iter(|| {
            for id in &ids {
                black_box(id.encode_to_buf(&mut buf));
            }
        });
    });
    group.bench_function(format!("decode/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for s in &encoded {
                black_box(Ksuid::decode(s).unwrap());
            }
        });
    });

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let ids = sample_ids();

    let mut group = c.benchmark_group("sort");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("sort/elems/{TOTAL_IDS}"), |b| {
        b.iter_batched_ref(
            || ids.clone(),
            |ids| sort::sort(black_box(ids)),
            criterion::BatchSize::SmallInput,
        );
    });
    group.bench_function(format!("is_sorted/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| black_box(sort::is_sorted(black_box(&ids))));
    });

    group.finish();
}

criterion_group!(benches, bench_generate, bench_base62, bench_sort);
criterion_main!(benches);
