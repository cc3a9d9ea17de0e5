//! Rate and alert repositories.
//!
//! The detection engine only reads rate rows and appends alert records;
//! both sides are traits so callers can plug in their own stores.

pub mod json_file;
pub mod memory;

pub use json_file::{JsonAlertLog, JsonRateFile};
pub use memory::InMemoryStore;

use crate::core::alert::AlertRecord;
use crate::core::currency::CurrencyCode;
use crate::core::observation::RateRecord;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store rejected the write: {0}")]
    Rejected(String),
}

/// Source of stored rate rows.
pub trait RateRepository {
    /// All rows for `currency`, ascending by date. May include rows marked
    /// invalid and several rows per date.
    fn rates_for_currency(&self, currency: &CurrencyCode) -> Result<Vec<RateRecord>, StorageError>;
}

/// Append-only alert store.
pub trait AlertRepository {
    /// Durably append one alert. Each call is atomic.
    fn save_alert(&mut self, alert: &AlertRecord) -> Result<Uuid, StorageError>;

    /// Stored alerts for `currency` with `start_date >= from` and
    /// `end_date <= to`, most recent first.
    fn alerts_for_currency(
        &self,
        currency: &CurrencyCode,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AlertRecord>, StorageError>;
}

/// Shared filter for [`AlertRepository::alerts_for_currency`] implementations.
pub(crate) fn filter_alerts<'a>(
    alerts: impl Iterator<Item = &'a AlertRecord>,
    currency: &CurrencyCode,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<AlertRecord> {
    let mut matching: Vec<AlertRecord> = alerts
        .filter(|a| &a.currency == currency)
        .filter(|a| from.map_or(true, |f| a.start_date >= f))
        .filter(|a| to.map_or(true, |t| a.end_date <= t))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    matching
}
