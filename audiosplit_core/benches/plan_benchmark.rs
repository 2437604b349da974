use std::time::Duration;

use audiosplit_core::plan_intervals;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

struct Scenario {
    name: &'static str,
    total: Duration,
    chunk_length: Duration,
    overlap: Duration,
}

fn plan_benchmarks(c: &mut Criterion) {
    let scenarios = [
        Scenario {
            name: "podcast_5m_chunks",
            total: Duration::from_secs(3 * 3_600),
            chunk_length: Duration::from_secs(300),
            overlap: Duration::ZERO,
        },
        Scenario {
            name: "audiobook_30s_overlap_2s",
            total: Duration::from_secs(20 * 3_600),
            chunk_length: Duration::from_secs(30),
            overlap: Duration::from_secs(2),
        },
        Scenario {
            name: "dense_1s_overlap_900ms",
            total: Duration::from_secs(3_600),
            chunk_length: Duration::from_secs(1),
            overlap: Duration::from_millis(900),
        },
    ];

    let mut group = c.benchmark_group("plan_intervals");

    for scenario in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(scenario.name),
            &scenario,
            |b, scenario| {
                b.iter(|| {
                    plan_intervals(
                        black_box(scenario.total),
                        black_box(scenario.chunk_length),
                        black_box(scenario.overlap),
                    )
                    .expect("valid geometry")
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, plan_benchmarks);
criterion_main!(benches);
