use crate::core::change_point::ChangePoint;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Order used to pick candidates: larger magnitude first, then earlier
/// start, then shorter duration.
///
/// A scan emits at most one candidate per `(start_date, end_date)` pair, so
/// this is a total order over any candidate list.
pub fn significance_order(a: &ChangePoint, b: &ChangePoint) -> Ordering {
    b.magnitude()
        .cmp(&a.magnitude())
        .then_with(|| a.start_date.cmp(&b.start_date))
        .then_with(|| a.duration_days.cmp(&b.duration_days))
}

/// Reduce overlapping candidates to a non-overlapping, chronological list.
///
/// # Algorithm
///
/// 1. Sort by [`significance_order`].
/// 2. Accept a candidate iff its inclusive `[start_date, end_date]` range
///    shares no calendar date with an already accepted one.
/// 3. Return accepted candidates ascending by `start_date`.
///
/// Accepted ranges are disjoint, so their end dates increase with their
/// start dates. The only accepted range that can collide with a candidate
/// is the one with the latest start on or before the candidate's end.
///
/// This greedy pass does not maximize total magnitude; weighted interval
/// scheduling (sort by end date + DP) would, at the cost of alerts that no
/// longer always include the single largest move.
pub fn resolve_overlaps(mut candidates: Vec<ChangePoint>) -> Vec<ChangePoint> {
    candidates.sort_by(significance_order);

    let mut accepted: BTreeMap<NaiveDate, ChangePoint> = BTreeMap::new();
    for candidate in candidates {
        let collides = accepted
            .range(..=candidate.end_date)
            .next_back()
            .is_some_and(|(_, prior)| prior.end_date >= candidate.start_date);
        if !collides {
            accepted.insert(candidate.start_date, candidate);
        }
    }

    accepted.into_values().collect()
}
