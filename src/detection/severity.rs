use crate::core::change_point::Severity;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HIGH_PERCENT: Decimal = dec!(5.0);
const ELEVATED_PERCENT: Decimal = dec!(3.0);
const NOTABLE_PERCENT: Decimal = dec!(2.0);
const FAST_MOVE_DAYS: i64 = 7;
const QUICK_MOVE_DAYS: i64 = 14;

/// Classify a move by its absolute percentage and duration.
///
/// Rules are evaluated in order, first match wins. All percentage
/// comparisons are strict:
///
/// 1. `High`: above 5%, or above 3% in under 7 days.
/// 2. `Medium`: above 3%, or above 2% in under 14 days.
/// 3. `Low`: everything else.
///
/// # Examples
///
/// ```
/// use fx_change_monitor::core::change_point::Severity;
/// use fx_change_monitor::detection::severity::classify;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(classify(dec!(5.0), 20), Severity::Medium);
/// assert_eq!(classify(dec!(5.01), 20), Severity::High);
/// ```
pub fn classify(abs_change_percent: Decimal, duration_days: i64) -> Severity {
    if abs_change_percent > HIGH_PERCENT
        || (abs_change_percent > ELEVATED_PERCENT && duration_days < FAST_MOVE_DAYS)
    {
        Severity::High
    } else if abs_change_percent > ELEVATED_PERCENT
        || (abs_change_percent > NOTABLE_PERCENT && duration_days < QUICK_MOVE_DAYS)
    {
        Severity::Medium
    } else {
        Severity::Low
    }
}
