use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostpulse::system::process::{ProcessRecord, ProcessStatus, SortKey, rank_processes};
use hostpulse::telemetry::series::{DEFAULT_CAPACITY, MetricPoint, SlidingWindowSeries};

fn make_records(n: usize) -> Vec<ProcessRecord> {
    (0..n)
        .map(|i| ProcessRecord {
            pid: i as u32 + 1,
            name: format!("proc_{i}"),
            memory_percent: ((i * 37) % 1000) as f64 / 10.0,
            cpu_percent: (i % 100) as f64,
            status: ProcessStatus::Running,
        })
        .collect()
}

fn bench_rank_processes(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_processes_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let records = make_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let ranked = rank_processes(black_box(records), SortKey::Memory, 20);
                black_box(ranked);
            })
        });
    }

    group.finish();
}

fn bench_series_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_append_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let Ok(mut series) = SlidingWindowSeries::new(DEFAULT_CAPACITY) else {
                    return;
                };
                for i in 0..size {
                    series.append(MetricPoint::new(Duration::from_millis(i as u64), i as f64));
                }
                black_box(series.latest());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank_processes, bench_series_append);
criterion_main!(benches);
