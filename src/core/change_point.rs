use crate::core::observation::RateObservation;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign of a rate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// `Positive` only for a strictly positive change.
    pub fn of(change_percent: Decimal) -> Self {
        if change_percent > Decimal::ZERO {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Positive => "positive",
            Direction::Negative => "negative",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity tier. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A significant rate move between two observations.
///
/// Produced by the change scanner as a candidate, then filtered by the
/// overlap resolver. `start_date < end_date` always holds, and
/// `change_percent` is relative to `start_rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_rate: Decimal,
    pub end_rate: Decimal,
    /// Signed percentage change, e.g. `-6` for a 6% drop.
    pub change_percent: Decimal,
    pub duration_days: i64,
    pub direction: Direction,
    pub severity: Severity,
}

impl ChangePoint {
    /// Build a change point from its two endpoint observations.
    ///
    /// The caller supplies the already computed percentage and severity;
    /// direction and duration are derived here.
    pub fn new(
        start: &RateObservation,
        end: &RateObservation,
        change_percent: Decimal,
        severity: Severity,
    ) -> Self {
        Self {
            start_date: start.date,
            end_date: end.date,
            start_rate: start.rate,
            end_rate: end.rate,
            change_percent,
            duration_days: (end.date - start.date).num_days(),
            direction: Direction::of(change_percent),
            severity,
        }
    }

    /// Absolute percentage change.
    pub fn magnitude(&self) -> Decimal {
        self.change_percent.abs()
    }

    /// Percentage change as `f64`, for display and JSON reports.
    pub fn change_percent_f64(&self) -> f64 {
        self.change_percent.to_f64().unwrap_or(0.0)
    }

    /// True if the inclusive date ranges share at least one calendar date.
    pub fn overlaps(&self, other: &ChangePoint) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}

impl fmt::Display for ChangePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}  {:.4} → {:.4}  {:+.2}% over {} days  [{}, {}]",
            self.start_date,
            self.end_date,
            self.start_rate,
            self.end_rate,
            self.change_percent_f64(),
            self.duration_days,
            self.direction,
            self.severity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn obs(day: u32, rate: Decimal) -> RateObservation {
        RateObservation::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), rate)
    }

    #[test]
    fn test_direction_of_zero_is_negative() {
        assert_eq!(Direction::of(Decimal::ZERO), Direction::Negative);
        assert_eq!(Direction::of(dec!(0.01)), Direction::Positive);
    }

    #[test]
    fn test_change_point_derives_duration_and_direction() {
        let cp = ChangePoint::new(&obs(1, dec!(5.00)), &obs(6, dec!(4.70)), dec!(-6), Severity::High);
        assert_eq!(cp.duration_days, 5);
        assert_eq!(cp.direction, Direction::Negative);
        assert_eq!(cp.magnitude(), dec!(6));
    }

    #[test]
    fn test_overlap_on_shared_endpoint() {
        let a = ChangePoint::new(&obs(1, dec!(1)), &obs(5, dec!(2)), dec!(100), Severity::High);
        let b = ChangePoint::new(&obs(5, dec!(2)), &obs(9, dec!(1)), dec!(-50), Severity::High);
        let c = ChangePoint::new(&obs(6, dec!(2)), &obs(9, dec!(1)), dec!(-50), Severity::High);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Medium).unwrap(), "\"medium\"");
        assert_eq!(serde_json::to_string(&Direction::Positive).unwrap(), "\"positive\"");
    }
}
