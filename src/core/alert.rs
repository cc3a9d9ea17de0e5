use crate::core::change_point::{ChangePoint, Direction, Severity};
use crate::core::currency::CurrencyCode;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted alert: one resolved [`ChangePoint`] tagged with its currency
/// and the time the detection ran.
///
/// Alert records are immutable once built. Stores treat them as an
/// append-only log; [`AlertRecord::idempotency_key`] identifies records
/// describing the same move across repeated runs.
///
/// # Examples
///
/// ```
/// use fx_change_monitor::core::alert::AlertRecord;
/// use fx_change_monitor::core::change_point::{ChangePoint, Severity};
/// use fx_change_monitor::core::currency::CurrencyCode;
/// use fx_change_monitor::core::observation::RateObservation;
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal_macros::dec;
///
/// let start = RateObservation::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec!(5.00));
/// let end = RateObservation::new(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), dec!(4.70));
/// let change = ChangePoint::new(&start, &end, dec!(-6), Severity::High);
///
/// let alert = AlertRecord::from_change(CurrencyCode::new("EUR"), &change, Utc::now());
/// assert_eq!(alert.duration_days, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub currency: CurrencyCode,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_rate: Decimal,
    pub end_rate: Decimal,
    pub change_percent: Decimal,
    pub duration_days: i64,
    pub direction: Direction,
    pub severity: Severity,
    pub detected_at: DateTime<Utc>,
}

impl AlertRecord {
    pub fn from_change(
        currency: CurrencyCode,
        change: &ChangePoint,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency,
            start_date: change.start_date,
            end_date: change.end_date,
            start_rate: change.start_rate,
            end_rate: change.end_rate,
            change_percent: change.change_percent,
            duration_days: change.duration_days,
            direction: change.direction,
            severity: change.severity,
            detected_at,
        }
    }

    /// `(currency, start_date, end_date)`: equal for alerts describing the
    /// same move, whatever run produced them.
    pub fn idempotency_key(&self) -> (CurrencyCode, NaiveDate, NaiveDate) {
        (self.currency.clone(), self.start_date, self.end_date)
    }

    /// Reconstruct the change point this alert was built from.
    pub fn change_point(&self) -> ChangePoint {
        ChangePoint {
            start_date: self.start_date,
            end_date: self.end_date,
            start_rate: self.start_rate,
            end_rate: self.end_rate,
            change_percent: self.change_percent,
            duration_days: self.duration_days,
            direction: self.direction,
            severity: self.severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observation::RateObservation;
    use rust_decimal_macros::dec;

    fn sample_change() -> ChangePoint {
        let start = RateObservation::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), dec!(4.90));
        let end = RateObservation::new(NaiveDate::from_ymd_opt(2024, 2, 11).unwrap(), dec!(5.00));
        ChangePoint::new(&start, &end, dec!(2.04), Severity::Medium)
    }

    #[test]
    fn test_alert_copies_change_fields() {
        let change = sample_change();
        let alert = AlertRecord::from_change(CurrencyCode::new("EUR"), &change, Utc::now());
        assert_eq!(alert.change_point(), change);
        assert_eq!(alert.currency.as_str(), "EUR");
    }

    #[test]
    fn test_idempotency_key_ignores_run() {
        let change = sample_change();
        let first = AlertRecord::from_change(CurrencyCode::new("EUR"), &change, Utc::now());
        let second = AlertRecord::from_change(CurrencyCode::new("EUR"), &change, Utc::now());
        assert_ne!(first.id, second.id);
        assert_eq!(first.idempotency_key(), second.idempotency_key());
    }

    #[test]
    fn test_alert_json_shape() {
        let alert = AlertRecord::from_change(CurrencyCode::new("EUR"), &sample_change(), Utc::now());
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["direction"], "positive");
        assert_eq!(value["severity"], "medium");
        assert_eq!(value["start_date"], "2024-02-01");
        assert_eq!(value["currency"], "EUR");
    }
}
