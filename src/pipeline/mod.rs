//! Load → detect → persist, one currency at a time.
//!
//! Each run receives its configuration and collaborators explicitly and
//! keeps no state between runs, so runs for different currencies are
//! independent of each other.

pub mod series;

pub use series::select_series;

use crate::core::alert::AlertRecord;
use crate::core::change_point::ChangePoint;
use crate::core::currency::CurrencyCode;
use crate::detection::detector::{ChangeDetector, DetectorConfig};
use crate::detection::{ConfigError, DetectionError};
use crate::storage::{AlertRepository, RateRepository, StorageError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

pub const CANONICAL_SOURCE_ENV: &str = "RATE_CANONICAL_SOURCE";

/// Errors that abort a whole run. Individual alert save failures do not:
/// they are counted in [`AnalysisOutcome::failed_count`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("loading rates for {currency}: {source}")]
    Load {
        currency: CurrencyCode,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error("deadline passed before persisting {detected} alerts for {currency}")]
    DeadlineExceeded {
        currency: CurrencyCode,
        detected: usize,
    },
}

/// Pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    /// Provider whose row is used when several valid rows share a date.
    pub canonical_source: Option<String>,
}

impl PipelineConfig {
    /// Defaults overridden by the detector variables and
    /// `RATE_CANONICAL_SOURCE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            detector: DetectorConfig::from_lookup(&lookup)?,
            canonical_source: lookup(CANONICAL_SOURCE_ENV).filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Result of one analyze-and-persist run.
///
/// `changes` always holds everything detected, whether or not it was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub currency: CurrencyCode,
    pub changes: Vec<ChangePoint>,
    pub persisted_count: usize,
    pub failed_count: usize,
}

impl AnalysisOutcome {
    pub fn detected_count(&self) -> usize {
        self.changes.len()
    }

    /// True when every detected change was saved.
    pub fn fully_persisted(&self) -> bool {
        self.failed_count == 0
    }
}

/// Overall result of a multi-currency run.
///
/// Alerts that failed to save do not fail the batch: their changes are
/// still reported and the failures are counted per currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every currency analyzed and every alert saved.
    Complete,
    /// Every currency analyzed, some alerts not saved.
    Partial,
    /// At least one currency could not be analyzed.
    Failed,
}

impl BatchStatus {
    pub fn of(results: &[(CurrencyCode, Result<AnalysisOutcome, AnalysisError>)]) -> Self {
        let mut status = BatchStatus::Complete;
        for (_, result) in results {
            match result {
                Err(_) => return BatchStatus::Failed,
                Ok(outcome) if !outcome.fully_persisted() => status = BatchStatus::Partial,
                Ok(_) => {}
            }
        }
        status
    }
}

/// Runs detection over a rate repository and appends alerts to an alert
/// repository.
///
/// # Examples
///
/// ```
/// use fx_change_monitor::prelude::*;
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal_macros::dec;
///
/// let eur = CurrencyCode::new("EUR");
/// let store: InMemoryStore = vec![
///     RateRecord::new(eur.clone(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec!(5.00)),
///     RateRecord::new(eur.clone(), NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), dec!(4.70)),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut pipeline =
///     AlertPipeline::new(PipelineConfig::default(), store.clone(), InMemoryStore::new()).unwrap();
/// let outcome = pipeline.analyze_and_persist(&eur, Utc::now()).unwrap();
/// assert_eq!(outcome.detected_count(), 1);
/// assert_eq!(outcome.persisted_count, 1);
/// ```
pub struct AlertPipeline<R, A> {
    config: PipelineConfig,
    detector: ChangeDetector,
    rates: R,
    alerts: A,
}

impl<R: RateRepository, A: AlertRepository> AlertPipeline<R, A> {
    /// Fails fast on an invalid detector configuration.
    pub fn new(config: PipelineConfig, rates: R, alerts: A) -> Result<Self, DetectionError> {
        let detector = ChangeDetector::new(&config.detector)?;
        Ok(Self {
            config,
            detector,
            rates,
            alerts,
        })
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    pub fn into_parts(self) -> (R, A) {
        (self.rates, self.alerts)
    }

    /// Detect without persisting.
    pub fn analyze(&self, currency: &CurrencyCode) -> Result<Vec<ChangePoint>, AnalysisError> {
        let records = self
            .rates
            .rates_for_currency(currency)
            .map_err(|source| AnalysisError::Load {
                currency: currency.clone(),
                source,
            })?;
        let series = select_series(&records, self.config.canonical_source.as_deref());
        Ok(self.detector.detect(&series)?)
    }

    /// Detect changes for `currency` and save one alert per change, stamped
    /// with `detected_at`.
    pub fn analyze_and_persist(
        &mut self,
        currency: &CurrencyCode,
        detected_at: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let changes = self.analyze(currency)?;
        Ok(self.persist(currency, changes, detected_at))
    }

    /// Like [`AlertPipeline::analyze_and_persist`], but gives up without
    /// saving anything if `deadline` has passed once detection finishes.
    pub fn analyze_and_persist_before(
        &mut self,
        currency: &CurrencyCode,
        detected_at: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let changes = self.analyze(currency)?;
        if Instant::now() >= deadline {
            return Err(AnalysisError::DeadlineExceeded {
                currency: currency.clone(),
                detected: changes.len(),
            });
        }
        Ok(self.persist(currency, changes, detected_at))
    }

    /// Run [`AlertPipeline::analyze_and_persist`] for each currency in turn.
    /// A failing currency does not stop the others.
    pub fn analyze_currencies(
        &mut self,
        currencies: &[CurrencyCode],
        detected_at: DateTime<Utc>,
    ) -> Vec<(CurrencyCode, Result<AnalysisOutcome, AnalysisError>)> {
        currencies
            .iter()
            .map(|c| (c.clone(), self.analyze_and_persist(c, detected_at)))
            .collect()
    }

    fn persist(
        &mut self,
        currency: &CurrencyCode,
        changes: Vec<ChangePoint>,
        detected_at: DateTime<Utc>,
    ) -> AnalysisOutcome {
        let mut persisted_count = 0;
        let mut failed_count = 0;

        for change in &changes {
            let alert = AlertRecord::from_change(currency.clone(), change, detected_at);
            match self.alerts.save_alert(&alert) {
                Ok(_) => persisted_count += 1,
                Err(e) => {
                    failed_count += 1;
                    warn!(
                        "failed to save {} alert {} → {}: {}",
                        currency, change.start_date, change.end_date, e
                    );
                }
            }
        }

        info!(
            "{}: {} significant changes detected, {} alerts saved",
            currency,
            changes.len(),
            persisted_count
        );

        AnalysisOutcome {
            currency: currency.clone(),
            changes,
            persisted_count,
            failed_count,
        }
    }
}
