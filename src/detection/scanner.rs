use crate::core::change_point::ChangePoint;
use crate::core::observation::RateObservation;
use crate::detection::severity::classify;
use crate::detection::DetectionError;
use rust_decimal::Decimal;

/// Windowed pairwise scan over a rate series.
///
/// For every start observation, walks forward through later observations
/// until the window is exceeded and emits a candidate for every pair whose
/// absolute change reaches the threshold. Candidates may overlap.
#[derive(Debug, Clone)]
pub struct ChangeScanner {
    threshold_percent: Decimal,
    max_duration_days: i64,
}

impl ChangeScanner {
    pub fn new(threshold_percent: Decimal, max_duration_days: i64) -> Result<Self, DetectionError> {
        if threshold_percent <= Decimal::ZERO {
            return Err(DetectionError::InvalidThreshold {
                threshold: threshold_percent,
            });
        }
        if max_duration_days <= 0 {
            return Err(DetectionError::InvalidWindow {
                days: max_duration_days,
            });
        }
        Ok(Self {
            threshold_percent,
            max_duration_days,
        })
    }

    /// Produce every candidate in the series.
    ///
    /// # Algorithm
    ///
    /// 1. Sort by date and collapse duplicate dates (last occurrence wins).
    /// 2. Reject any non-positive rate.
    /// 3. For each start index `i`, advance `j` while
    ///    `date[j] - date[i] <= max_duration_days`. Dates are strictly
    ///    increasing after step 1, so the first out-of-window `j` ends the
    ///    inner loop: `O(n · k)` with `k` the observations per window.
    pub fn scan(&self, observations: &[RateObservation]) -> Result<Vec<ChangePoint>, DetectionError> {
        let series = normalize(observations);
        if series.len() < 2 {
            return Ok(Vec::new());
        }

        if let Some(bad) = series.iter().find(|o| o.rate <= Decimal::ZERO) {
            return Err(DetectionError::NonPositiveRate {
                date: bad.date,
                rate: bad.rate,
            });
        }

        let mut candidates = Vec::new();
        for (i, start) in series.iter().enumerate() {
            for end in &series[i + 1..] {
                let duration_days = (end.date - start.date).num_days();
                if duration_days > self.max_duration_days {
                    break;
                }

                let change_percent = percent_change(start, end)?;
                let magnitude = change_percent.abs();
                if magnitude >= self.threshold_percent {
                    let severity = classify(magnitude, duration_days);
                    candidates.push(ChangePoint::new(start, end, change_percent, severity));
                }
            }
        }

        Ok(candidates)
    }
}

/// Ascending by date, one observation per date.
fn normalize(observations: &[RateObservation]) -> Vec<RateObservation> {
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.date);

    let mut series: Vec<RateObservation> = Vec::with_capacity(sorted.len());
    for obs in sorted {
        match series.last_mut() {
            Some(last) if last.date == obs.date => *last = obs,
            _ => series.push(obs),
        }
    }
    series
}

/// `(end - start) / start * 100`. `start.rate` must already be positive.
fn percent_change(start: &RateObservation, end: &RateObservation) -> Result<Decimal, DetectionError> {
    (end.rate - start.rate)
        .checked_div(start.rate)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(DetectionError::ChangeOverflow {
            start_date: start.date,
            end_date: end.date,
        })
}
