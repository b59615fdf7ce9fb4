use std::hint::black_box;
use std::num::NonZeroUsize;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runmed_core::{MedianConfig, MedianHeap, MovingMedian, batch};

fn random_values(len: usize) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(123);
    (0..len).map(|_| rng.random_range(-1_000_000..=1_000_000)).collect()
}

fn bench_median_operations(c: &mut Criterion) {
    let values = random_values(10_000);
    let config = MedianConfig::<i64>::averaged();

    c.bench_function("median_heap_insert_10k", |b| {
        b.iter_with_setup(
            || MedianHeap::with_capacity(config, values.len()),
            |mut heap| {
                for &value in &values {
                    heap.insert(black_box(value));
                }
                heap
            },
        );
    });

    c.bench_function("median_heap_read", |b| {
        let mut heap = MedianHeap::new(config);
        for &value in &values {
            heap.insert(value);
        }

        b.iter(|| black_box(heap.median()));
    });

    c.bench_function("median_heap_insert_remove", |b| {
        let mut heap = MedianHeap::new(config);
        for &value in &values {
            heap.insert(value);
        }

        b.iter(|| {
            let id = heap.insert(black_box(42));
            black_box(heap.remove(id))
        });
    });

    // Every step reads the median, the batch engine re-sorts each time.
    let window = NonZeroUsize::new(256).unwrap();
    c.bench_function("moving_median_256", |b| {
        b.iter_with_setup(
            || MovingMedian::new(window, config),
            |mut moving| {
                for &value in &values[..2048] {
                    moving.push(black_box(value)).ok();
                    black_box(moving.median().ok());
                }
            },
        );
    });

    c.bench_function("batch_median_256", |b| {
        b.iter(|| {
            for end in window.get()..2048 {
                let slice = values[end - window.get()..end].to_vec();
                black_box(batch::median(slice, &config).ok());
            }
        });
    });
}

criterion_group!(benches, bench_median_operations);
criterion_main!(benches);
