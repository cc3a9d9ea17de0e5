use crate::core::alert::AlertRecord;
use crate::core::currency::CurrencyCode;
use crate::core::observation::RateRecord;
use crate::storage::{filter_alerts, AlertRepository, RateRepository, StorageError};
use chrono::NaiveDate;
use uuid::Uuid;

/// Rates and alerts held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rates: Vec<RateRecord>,
    alerts: Vec<AlertRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[AlertRecord] {
        &self.alerts
    }
}

impl FromIterator<RateRecord> for InMemoryStore {
    fn from_iter<T: IntoIterator<Item = RateRecord>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().collect(),
            alerts: Vec::new(),
        }
    }
}

impl RateRepository for InMemoryStore {
    fn rates_for_currency(&self, currency: &CurrencyCode) -> Result<Vec<RateRecord>, StorageError> {
        let mut rows: Vec<RateRecord> = self
            .rates
            .iter()
            .filter(|r| &r.currency == currency)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }
}

impl AlertRepository for InMemoryStore {
    fn save_alert(&mut self, alert: &AlertRecord) -> Result<Uuid, StorageError> {
        self.alerts.push(alert.clone());
        Ok(alert.id)
    }

    fn alerts_for_currency(
        &self,
        currency: &CurrencyCode,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AlertRecord>, StorageError> {
        Ok(filter_alerts(self.alerts.iter(), currency, from, to))
    }
}
