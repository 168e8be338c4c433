use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ziplist::{BufferPool, ZipList, ZipListConfig};

fn populated(size: usize) -> ZipList {
    let mut list = ZipList::new();
    for i in 0..size {
        let data = format!("element_{}", i);
        list.push(data.as_bytes()).unwrap();
    }
    list
}

fn bench_sequential_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_push");

    for size in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("small_elements", size),
            size,
            |b, &size| {
                b.iter(|| {
                    let list = populated(size);
                    black_box(list.len().unwrap())
                });
            },
        );
    }
    group.finish();
}

fn bench_indexed_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexed_get");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("get_operations", size),
            size,
            |b, &size| {
                let list = populated(size);

                b.iter(|| {
                    for i in 0..size {
                        black_box(list.get(i).unwrap());
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_iterator_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterator");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("full_iteration", size),
            size,
            |b, &size| {
                let list = populated(size);

                b.iter(|| {
                    for payload in black_box(&list) {
                        black_box(payload);
                    }
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("reverse_iteration", size),
            size,
            |b, &size| {
                let list = populated(size);

                b.iter(|| {
                    for payload in list.iter_rev().unwrap() {
                        black_box(payload);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_delete_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_front");

    for size in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("drain_from_front", size),
            size,
            |b, &size| {
                b.iter(|| {
                    let mut list = populated(size);
                    for _ in 0..size {
                        list.delete(0).unwrap();
                    }
                    black_box(list.is_empty().unwrap())
                });
            },
        );
    }
    group.finish();
}

fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");

    for size in [10, 100].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("threshold_entries", size),
            size,
            |b, &size| {
                let config = ZipListConfig::default().with_max_entry_size(400);
                b.iter(|| {
                    let mut list = ZipList::with_config(config).unwrap();
                    list.push(&[0u8; 300]).unwrap();
                    list.push(&[0u8; 1]).unwrap();
                    // 247-byte payloads sit right below the prevlen threshold
                    for _ in 0..size {
                        list.push(&[1u8; 247]).unwrap();
                    }
                    list.delete(1).unwrap();
                    black_box(list.total_size().unwrap())
                });
            },
        );
    }
    group.finish();
}

fn bench_pooled_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("pooled");

    group.bench_function("create_release", |b| {
        let pool = BufferPool::shared(16);
        b.iter(|| {
            let mut list = ZipList::with_source(ZipListConfig::default(), pool.clone()).unwrap();
            list.push(b"short lived").unwrap();
            list.release();
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_push,
    bench_indexed_get,
    bench_iterator_performance,
    bench_delete_front,
    bench_cascade,
    bench_pooled_lists
);
criterion_main!(benches);
