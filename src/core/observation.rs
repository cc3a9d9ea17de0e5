use crate::core::currency::CurrencyCode;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily rate observation: the input unit of the change scanner.
///
/// The rate is not validated on construction. The scanner rejects
/// non-positive rates before computing any percentage change.
///
/// # Examples
///
/// ```
/// use fx_change_monitor::core::observation::RateObservation;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let obs = RateObservation::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), dec!(4.9712));
/// assert_eq!(obs.rate, dec!(4.9712));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub rate: Decimal,
}

impl RateObservation {
    pub fn new(date: NaiveDate, rate: Decimal) -> Self {
        Self { date, rate }
    }
}

/// A stored rate row as returned by a rate repository.
///
/// Several rows may exist for the same currency and date when more than one
/// provider supplied a quote. `multiplier` is the quoting unit: a rate of
/// `1.5123` with multiplier `100` means 100 units cost 1.5123.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub currency: CurrencyCode,
    pub date: NaiveDate,
    pub rate: Decimal,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
    #[serde(default = "default_valid")]
    pub is_valid: bool,
}

fn default_source() -> String {
    "unknown".to_string()
}

fn default_multiplier() -> u32 {
    1
}

fn default_valid() -> bool {
    true
}

impl RateRecord {
    pub fn new(currency: CurrencyCode, date: NaiveDate, rate: Decimal) -> Self {
        Self {
            currency,
            date,
            rate,
            source: default_source(),
            multiplier: default_multiplier(),
            is_valid: true,
        }
    }

    /// Set the provider that supplied this row.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the quoting unit.
    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Mark the row as rejected by upstream validation.
    pub fn invalid(mut self) -> Self {
        self.is_valid = false;
        self
    }

    /// Rate for a single unit of the currency.
    pub fn unit_rate(&self) -> Decimal {
        if self.multiplier <= 1 {
            self.rate
        } else {
            self.rate / Decimal::from(self.multiplier)
        }
    }

    pub fn observation(&self) -> RateObservation {
        RateObservation::new(self.date, self.unit_rate())
    }
}
