use crate::core::observation::{RateObservation, RateRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Turn stored rows into the scanner's input: valid rows only, one per date,
/// ascending.
///
/// When several valid rows share a date, a row from `canonical_source` wins;
/// otherwise the row appearing last wins.
pub fn select_series(records: &[RateRecord], canonical_source: Option<&str>) -> Vec<RateObservation> {
    let is_canonical = |r: &RateRecord| canonical_source.is_some_and(|s| r.source == s);

    let mut by_date: BTreeMap<NaiveDate, &RateRecord> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_valid) {
        by_date
            .entry(record.date)
            .and_modify(|kept| {
                if is_canonical(record) || !is_canonical(*kept) {
                    *kept = record;
                }
            })
            .or_insert(record);
    }

    by_date.values().map(|r| r.observation()).collect()
}
