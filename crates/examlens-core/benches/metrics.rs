use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examlens_core::fixtures::builtin_dataset;
use examlens_core::metrics::{overall_accuracy, score_prediction, study_efficiency, MetricsConfig};
use examlens_core::model::ProgressEntry;
use examlens_core::report::DashboardReport;
use examlens_core::statistics::linear_fit;

fn synthetic_history(n: usize) -> Vec<ProgressEntry> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    (0..n)
        .map(|i| ProgressEntry {
            name: format!("Practice {i}"),
            date: start + chrono::Days::new(i as u64 * 7),
            score: 100 + (i as i32 * 3) % 150,
            accuracy: 40.0 + (i % 50) as f64,
            total_questions: 90,
        })
        .collect()
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_prediction");
    let config = MetricsConfig::default();

    let fixture = builtin_dataset().unwrap();
    group.bench_function("fixture", |b| {
        b.iter(|| score_prediction(black_box(&fixture.progress), black_box(&config)))
    });

    for n in [100, 10_000] {
        let history = synthetic_history(n);
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| score_prediction(black_box(&history), black_box(&config)))
        });
    }

    group.finish();
}

fn bench_linear_fit(c: &mut Criterion) {
    let values: Vec<f64> = (0..1_000).map(|i| (i as f64).sqrt() * 10.0).collect();
    c.bench_function("linear_fit/n=1000", |b| {
        b.iter(|| linear_fit(black_box(&values)))
    });
}

fn bench_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");
    let config = MetricsConfig::default();
    let fixture = builtin_dataset().unwrap();

    group.bench_function("overall_accuracy", |b| {
        b.iter(|| overall_accuracy(black_box(&fixture.tests)))
    });

    group.bench_function("study_efficiency", |b| {
        b.iter(|| study_efficiency(black_box(&fixture.tests), black_box(&config)))
    });

    group.bench_function("full_report", |b| {
        b.iter(|| DashboardReport::compute(black_box(&fixture), black_box(&config)))
    });

    group.finish();
}

criterion_group!(benches, bench_prediction, bench_linear_fit, bench_dashboard);
criterion_main!(benches);
