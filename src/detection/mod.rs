//! Significant-change detection: scan, classify, resolve overlaps.

pub mod detector;
pub mod overlap;
pub mod scanner;
pub mod severity;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised before or during a scan. Fewer than two observations is
/// not an error: the scan simply yields nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("change threshold must be positive, got {threshold}%")]
    InvalidThreshold { threshold: Decimal },
    #[error("maximum window must be at least one day, got {days}")]
    InvalidWindow { days: i64 },
    #[error("rate must be positive, got {rate} on {date}")]
    NonPositiveRate { date: NaiveDate, rate: Decimal },
    #[error("percentage change from {start_date} to {end_date} overflows")]
    ChangeOverflow {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Errors reading configuration from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a number, got '{value}'")]
    Malformed { key: String, value: String },
    #[error(transparent)]
    Invalid(#[from] DetectionError),
}
