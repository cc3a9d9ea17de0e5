use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fx_change_monitor::core::observation::RateObservation;
use fx_change_monitor::detection::detector::{ChangeDetector, DetectorConfig};
use fx_change_monitor::pipeline::select_series;
use fx_change_monitor::simulation::random_walk::{generate_rate_series_with, SeriesConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn series(years: usize) -> Vec<RateObservation> {
    let config = SeriesConfig {
        days: years * 365,
        ..Default::default()
    };
    let records = generate_rate_series_with(&config, &mut StdRng::seed_from_u64(11));
    select_series(&records, None)
}

fn bench_detect_1_year(c: &mut Criterion) {
    let observations = series(1);
    let detector = ChangeDetector::new(&DetectorConfig::default()).unwrap();

    c.bench_function("detect_1_year", |b| {
        b.iter(|| detector.detect(black_box(&observations)))
    });
}

fn bench_detect_10_years(c: &mut Criterion) {
    let observations = series(10);
    let detector = ChangeDetector::new(&DetectorConfig::default()).unwrap();

    c.bench_function("detect_10_years", |b| {
        b.iter(|| detector.detect(black_box(&observations)))
    });
}

fn bench_detect_30_years(c: &mut Criterion) {
    let observations = series(30);
    let detector = ChangeDetector::new(&DetectorConfig::default()).unwrap();

    c.bench_function("detect_30_years", |b| {
        b.iter(|| detector.detect(black_box(&observations)))
    });
}

criterion_group!(
    benches,
    bench_detect_1_year,
    bench_detect_10_years,
    bench_detect_30_years
);
criterion_main!(benches);
