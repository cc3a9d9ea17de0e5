//! Synthetic rate series for testing and benchmarking.
//!
//! Generates a daily random walk in percentage steps so detection can be
//! exercised on multi-year series without real market data.

use crate::core::currency::CurrencyCode;
use crate::core::observation::RateRecord;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use rust_decimal::Decimal;

/// Longest series the generator produces, about a century of days.
pub const MAX_SERIES_DAYS: usize = 36_600;

/// Configuration for generating a synthetic rate series.
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    pub currency: CurrencyCode,
    /// Date of the first observation.
    pub start_date: NaiveDate,
    /// Number of calendar days covered, capped at [`MAX_SERIES_DAYS`].
    pub days: usize,
    pub start_rate: Decimal,
    /// Largest daily move, in percent, drawn uniformly in `[-v, v]`.
    pub daily_volatility_percent: f64,
    /// Omit Saturdays and Sundays, as central bank fixings do.
    pub skip_weekends: bool,
    pub source: String,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::new("EUR"),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            days: 365,
            start_rate: Decimal::new(49_750, 4),
            daily_volatility_percent: 0.4,
            skip_weekends: true,
            source: "synthetic".to_string(),
        }
    }
}

/// Generate a random series using the thread-local RNG.
pub fn generate_rate_series(config: &SeriesConfig) -> Vec<RateRecord> {
    generate_rate_series_with(config, &mut rand::thread_rng())
}

/// Generate a random series from a caller-supplied RNG (seed it for
/// reproducible series).
///
/// The series stops early at the last date chrono can represent.
pub fn generate_rate_series_with<R: Rng>(config: &SeriesConfig, rng: &mut R) -> Vec<RateRecord> {
    let floor = Decimal::new(1, 4);
    let mut rate = config.start_rate.max(floor);
    let days = config.days.min(MAX_SERIES_DAYS);
    let mut series = Vec::with_capacity(days);

    for offset in 0..days {
        let date = match config.start_date.checked_add_signed(Duration::days(offset as i64)) {
            Some(date) => date,
            None => break,
        };
        if config.skip_weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        series.push(
            RateRecord::new(config.currency.clone(), date, rate).with_source(config.source.clone()),
        );

        let step = if config.daily_volatility_percent > 0.0 {
            rng.gen_range(-config.daily_volatility_percent..=config.daily_volatility_percent)
        } else {
            0.0
        };
        let factor = Decimal::from_f64_retain(1.0 + step / 100.0).unwrap_or(Decimal::ONE);
        rate = (rate * factor).round_dp(4).max(floor);
    }

    series
}
