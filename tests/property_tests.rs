use chrono::{Duration, NaiveDate};
use fx_change_monitor::core::change_point::ChangePoint;
use fx_change_monitor::core::observation::RateObservation;
use fx_change_monitor::detection::detector::{detect_changes, ChangeDetector, DetectorConfig};
use fx_change_monitor::detection::severity::classify;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A series of 0..80 observations with strictly increasing dates (gaps of
/// 1–5 days) and rates between 4.0000 and 6.0000.
fn arb_series() -> impl Strategy<Value = Vec<RateObservation>> {
    prop::collection::vec((1i64..=5, 40_000i64..=60_000), 0..80).prop_map(|steps| {
        let mut date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        steps
            .into_iter()
            .map(|(gap, rate)| {
                date += Duration::days(gap);
                RateObservation::new(date, Decimal::new(rate, 4))
            })
            .collect()
    })
}

fn arb_threshold() -> impl Strategy<Value = Decimal> {
    (5u32..=80).prop_map(|tenths| Decimal::new(tenths as i64, 1))
}

fn percent(start: &RateObservation, end: &RateObservation) -> Decimal {
    (end.rate - start.rate) / start.rate * dec!(100)
}

proptest! {
    // ===================================================================
    // Every in-window pair that reaches the threshold is a candidate.
    // ===================================================================
    #[test]
    fn scan_is_complete(series in arb_series(), threshold in arb_threshold(), window in 1i64..=60) {
        let config = DetectorConfig { threshold_percent: threshold, max_duration_days: window };
        let candidates = ChangeDetector::new(&config).unwrap().candidates(&series).unwrap();

        let mut expected = 0;
        for (i, start) in series.iter().enumerate() {
            for end in &series[i + 1..] {
                let duration = (end.date - start.date).num_days();
                if duration <= window && percent(start, end).abs() >= threshold {
                    expected += 1;
                    prop_assert!(candidates
                        .iter()
                        .any(|c| c.start_date == start.date && c.end_date == end.date));
                }
            }
        }
        prop_assert_eq!(candidates.len(), expected);
    }

    // ===================================================================
    // Candidates respect the window and the severity rules.
    // ===================================================================
    #[test]
    fn candidates_are_well_formed(series in arb_series(), threshold in arb_threshold(), window in 1i64..=60) {
        let config = DetectorConfig { threshold_percent: threshold, max_duration_days: window };
        for c in ChangeDetector::new(&config).unwrap().candidates(&series).unwrap() {
            prop_assert!(c.start_date < c.end_date);
            prop_assert!(c.duration_days <= window);
            prop_assert!(c.magnitude() >= threshold);
            prop_assert_eq!(c.severity, classify(c.magnitude(), c.duration_days));
        }
    }

    // ===================================================================
    // Resolved changes never share a calendar date.
    // ===================================================================
    #[test]
    fn resolved_changes_do_not_overlap(series in arb_series(), threshold in arb_threshold()) {
        let changes = detect_changes(&series, threshold, 60).unwrap();
        for (i, a) in changes.iter().enumerate() {
            for b in &changes[i + 1..] {
                prop_assert!(!a.overlaps(b), "{} overlaps {}", a, b);
            }
        }
    }

    // ===================================================================
    // Resolved changes are ascending by start date.
    // ===================================================================
    #[test]
    fn resolved_changes_are_chronological(series in arb_series(), threshold in arb_threshold()) {
        let changes = detect_changes(&series, threshold, 60).unwrap();
        prop_assert!(changes.windows(2).all(|w| w[0].start_date < w[1].start_date));
    }

    // ===================================================================
    // Same input, same output; input order does not matter.
    // ===================================================================
    #[test]
    fn detection_is_deterministic(series in arb_series(), threshold in arb_threshold()) {
        let first = detect_changes(&series, threshold, 60).unwrap();
        let second = detect_changes(&series, threshold, 60).unwrap();
        prop_assert_eq!(&first, &second);

        let mut reversed = series.clone();
        reversed.reverse();
        let third: Vec<ChangePoint> = detect_changes(&reversed, threshold, 60).unwrap();
        prop_assert_eq!(&first, &third);
    }

    // ===================================================================
    // The largest candidate always survives resolution.
    // ===================================================================
    #[test]
    fn largest_move_survives(series in arb_series(), threshold in arb_threshold()) {
        let config = DetectorConfig { threshold_percent: threshold, max_duration_days: 60 };
        let detector = ChangeDetector::new(&config).unwrap();
        let candidates = detector.candidates(&series).unwrap();
        let resolved = detector.detect(&series).unwrap();

        if let Some(max) = candidates.iter().map(|c| c.magnitude()).max() {
            prop_assert!(resolved.iter().any(|c| c.magnitude() == max));
        } else {
            prop_assert!(resolved.is_empty());
        }
    }
}
