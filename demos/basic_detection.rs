//! Basic significant-change detection example.
//!
//! Builds a short EUR series with one sharp drop and one slow rally, runs
//! the pipeline against in-memory stores, and prints the resulting alerts.

use chrono::{Duration, NaiveDate, Utc};
use fx_change_monitor::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  fx-change-monitor: Basic Detection Example ║");
    println!("╚════════════════════════════════════════════╝\n");

    let eur = CurrencyCode::new("EUR");
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let rates = [
        (0, dec!(4.9700)),
        (3, dec!(4.9650)),
        (5, dec!(4.6800)),
        (12, dec!(4.7100)),
        (30, dec!(4.7500)),
        (45, dec!(4.8900)),
        (52, dec!(4.9950)),
    ];

    let store: InMemoryStore = rates
        .iter()
        .map(|(offset, rate)| {
            RateRecord::new(eur.clone(), start + Duration::days(*offset), *rate).with_source("BNR")
        })
        .collect();

    // --- Scenario 1: detection only ---
    println!("━━━ Scenario 1: Detection ━━━\n");

    let observations: Vec<RateObservation> = rates
        .iter()
        .map(|(offset, rate)| RateObservation::new(start + Duration::days(*offset), *rate))
        .collect();
    let changes = detect_changes(&observations, dec!(2.0), 60).expect("valid configuration");
    for change in &changes {
        println!("  {}", change);
    }

    // --- Scenario 2: analyze and persist ---
    println!("\n━━━ Scenario 2: Analyze and Persist ━━━\n");

    let config = PipelineConfig {
        canonical_source: Some("BNR".to_string()),
        ..Default::default()
    };
    let mut pipeline =
        AlertPipeline::new(config, store, InMemoryStore::new()).expect("valid configuration");
    let outcome = pipeline
        .analyze_and_persist(&eur, Utc::now())
        .expect("in-memory stores do not fail");

    println!(
        "  Detected {} changes, saved {} alerts",
        outcome.detected_count(),
        outcome.persisted_count
    );
    for alert in pipeline.alerts().alerts() {
        println!(
            "  [{}] {} {} → {} ({:+.2}%)",
            alert.severity,
            alert.currency,
            alert.start_date,
            alert.end_date,
            alert.change_point().change_percent_f64()
        );
    }
}
