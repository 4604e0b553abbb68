use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use gym_tracker::models::TrainingFocus;
use gym_tracker::services::progress::streak_summary;
use gym_tracker::services::split_generator::generate_splits;
use std::hint::black_box;

fn benchmark_generate_splits(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_splits");

    for &focus in TrainingFocus::all() {
        group.bench_function(focus.as_str(), |b| {
            b.iter(|| {
                for frequency in 3..=6 {
                    black_box(generate_splits(black_box(frequency), focus).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn benchmark_streaks(c: &mut Criterion) {
    // Two years of training, four sessions a week.
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
    let completions: Vec<_> = (0..730)
        .filter(|d| d % 7 < 4)
        .map(|d| start + Duration::days(d))
        .collect();
    let today = (start + Duration::days(729)).date_naive();

    c.bench_function("streak_summary_two_years", |b| {
        b.iter(|| streak_summary(black_box(&completions), today))
    });
}

criterion_group!(benches, benchmark_generate_splits, benchmark_streaks);
criterion_main!(benches);
