use crate::core::change_point::ChangePoint;
use crate::core::observation::RateObservation;
use crate::detection::overlap::resolve_overlaps;
use crate::detection::scanner::ChangeScanner;
use crate::detection::{ConfigError, DetectionError};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const THRESHOLD_ENV: &str = "RATE_CHANGE_THRESHOLD_PERCENT";
pub const MAX_DURATION_ENV: &str = "RATE_CHANGE_MAX_DURATION_DAYS";

/// Detection parameters. Passed explicitly to every run; nothing is cached
/// between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum absolute percentage change, e.g. `2.0` for 2%.
    pub threshold_percent: Decimal,
    /// Longest window, in calendar days, between start and end observation.
    pub max_duration_days: i64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_percent: dec!(2.0),
            max_duration_days: 60,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), DetectionError> {
        ChangeScanner::new(self.threshold_percent, self.max_duration_days).map(|_| ())
    }

    /// Defaults overridden by `RATE_CHANGE_THRESHOLD_PERCENT` and
    /// `RATE_CHANGE_MAX_DURATION_DAYS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`DetectorConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(THRESHOLD_ENV) {
            config.threshold_percent = parse_value(THRESHOLD_ENV, &value)?;
        }
        if let Some(value) = lookup(MAX_DURATION_ENV) {
            config.max_duration_days = parse_value(MAX_DURATION_ENV, &value)?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Malformed {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Scan → classify → resolve, for one series.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    scanner: ChangeScanner,
}

impl ChangeDetector {
    /// Fails fast on a non-positive threshold or window.
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectionError> {
        Ok(Self {
            scanner: ChangeScanner::new(config.threshold_percent, config.max_duration_days)?,
        })
    }

    /// All candidates before overlap resolution.
    pub fn candidates(&self, observations: &[RateObservation]) -> Result<Vec<ChangePoint>, DetectionError> {
        self.scanner.scan(observations)
    }

    /// Non-overlapping significant changes, ascending by start date.
    pub fn detect(&self, observations: &[RateObservation]) -> Result<Vec<ChangePoint>, DetectionError> {
        let candidates = self.candidates(observations)?;
        let candidate_count = candidates.len();
        let changes = resolve_overlaps(candidates);
        debug!(
            "scanned {} observations: {} candidates, {} after overlap resolution",
            observations.len(),
            candidate_count,
            changes.len()
        );
        Ok(changes)
    }
}

/// Detect significant changes in `observations`.
///
/// # Examples
///
/// ```
/// use fx_change_monitor::core::change_point::Severity;
/// use fx_change_monitor::core::observation::RateObservation;
/// use fx_change_monitor::detection::detector::detect_changes;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let series = vec![
///     RateObservation::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec!(5.00)),
///     RateObservation::new(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), dec!(4.70)),
/// ];
///
/// let changes = detect_changes(&series, dec!(2.0), 60).unwrap();
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].severity, Severity::High);
/// ```
pub fn detect_changes(
    observations: &[RateObservation],
    threshold_percent: Decimal,
    max_duration_days: i64,
) -> Result<Vec<ChangePoint>, DetectionError> {
    let config = DetectorConfig {
        threshold_percent,
        max_duration_days,
    };
    ChangeDetector::new(&config)?.detect(observations)
}
