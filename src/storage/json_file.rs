use crate::core::alert::AlertRecord;
use crate::core::currency::CurrencyCode;
use crate::core::observation::RateRecord;
use crate::storage::{filter_alerts, AlertRepository, RateRepository, StorageError};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// On-disk layout of a rate file:
///
/// ```json
/// { "rates": [ { "currency": "EUR", "date": "2024-01-02", "rate": "4.9713", "source": "BNR" } ] }
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RatesFile {
    pub rates: Vec<RateRecord>,
}

/// Read-only rate repository loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonRateFile {
    rates: Vec<RateRecord>,
}

impl JsonRateFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let content = fs::read_to_string(path)?;
        let file: RatesFile = serde_json::from_str(&content)?;
        Ok(Self { rates: file.rates })
    }

    /// Write `rates` in the layout [`JsonRateFile::open`] reads.
    pub fn write(path: impl AsRef<Path>, rates: Vec<RateRecord>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&RatesFile { rates })?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Distinct currencies present in the file.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut currencies: Vec<CurrencyCode> = self.rates.iter().map(|r| r.currency.clone()).collect();
        currencies.sort();
        currencies.dedup();
        currencies
    }
}

impl RateRepository for JsonRateFile {
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

/// Append-only alert log: one JSON object per line.
///
/// Every save opens the file in append mode and writes a single line. A line
/// torn by an interrupted save is terminated before the next append, and
/// reads skip lines that do not parse, so one bad write never hides the
/// alerts around it.
#[derive(Debug, Clone)]
pub struct JsonAlertLog {
    path: PathBuf,
}

impl JsonAlertLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<AlertRecord>, StorageError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut alerts = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(alert) => alerts.push(alert),
                Err(e) => warn!(
                    "skipping unreadable alert at {}:{}: {}",
                    self.path.display(),
                    index + 1,
                    e
                ),
            }
        }
        Ok(alerts)
    }
}

/// True for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut fs::File) -> Result<bool, StorageError> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl AlertRepository for JsonAlertLog {
    fn save_alert(&mut self, alert: &AlertRecord) -> Result<Uuid, StorageError> {
        let mut line = serde_json::to_string(alert)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        if !ends_with_newline(&mut file)? {
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes())?;
        Ok(alert.id)
    }

    fn alerts_for_currency(
        &self,
        currency: &CurrencyCode,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AlertRecord>, StorageError> {
        let alerts = self.read_all()?;
        Ok(filter_alerts(alerts.iter(), currency, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::change_point::{ChangePoint, Severity};
    use crate::core::observation::RateObservation;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_rate_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        JsonRateFile::write(
            &path,
            vec![
                RateRecord::new(CurrencyCode::new("EUR"), day(2), dec!(4.98)).with_source("BNR"),
                RateRecord::new(CurrencyCode::new("USD"), day(1), dec!(4.51)),
                RateRecord::new(CurrencyCode::new("EUR"), day(1), dec!(4.97)),
            ],
        )
        .unwrap();

        let file = JsonRateFile::open(&path).unwrap();
        assert_eq!(file.len(), 3);
        assert_eq!(file.currencies(), vec![CurrencyCode::new("EUR"), CurrencyCode::new("USD")]);

        let eur = file.rates_for_currency(&CurrencyCode::new("EUR")).unwrap();
        assert_eq!(eur[0].date, day(1));
        assert_eq!(eur[1].source, "BNR");
    }

    #[test]
    fn test_rate_file_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        fs::write(&path, "{ \"rates\": [ { \"currency\": \"EUR\" } ] }").unwrap();
        assert!(matches!(JsonRateFile::open(&path), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_missing_rate_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            JsonRateFile::open(dir.path().join("absent.json")),
            Err(StorageError::Io(_))
        ));
    }

    #[test]
    fn test_alert_log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = JsonAlertLog::new(dir.path().join("alerts.jsonl"));
        let eur = CurrencyCode::new("EUR");

        assert!(log.alerts_for_currency(&eur, None, None).unwrap().is_empty());

        for (start, end) in [(1, 5), (8, 12)] {
            let change = ChangePoint::new(
                &RateObservation::new(day(start), dec!(5.0)),
                &RateObservation::new(day(end), dec!(5.2)),
                dec!(4),
                Severity::Medium,
            );
            log.save_alert(&AlertRecord::from_change(eur.clone(), &change, Utc::now()))
                .unwrap();
        }

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 2);

        let stored = log.alerts_for_currency(&eur, None, None).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].start_date, day(8));
    }

    #[test]
    fn test_torn_line_does_not_corrupt_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = JsonAlertLog::new(dir.path().join("alerts.jsonl"));
        let eur = CurrencyCode::new("EUR");
        let alert = |start: u32, end: u32| {
            let change = ChangePoint::new(
                &RateObservation::new(day(start), dec!(5.0)),
                &RateObservation::new(day(end), dec!(5.2)),
                dec!(4),
                Severity::Medium,
            );
            AlertRecord::from_change(eur.clone(), &change, Utc::now())
        };

        log.save_alert(&alert(1, 5)).unwrap();
        OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap()
            .write_all(b"{\"id\":\"abc")
            .unwrap();
        log.save_alert(&alert(8, 12)).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 3);

        let stored = log.alerts_for_currency(&eur, None, None).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].start_date, day(8));
        assert_eq!(stored[1].start_date, day(1));
    }
}
