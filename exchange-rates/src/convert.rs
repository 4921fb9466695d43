//! Conversion arithmetic over a snapshot.

use crate::RateSnapshot;

/// Converts `amount` from one currency to another using `snapshot`.
///
/// Returns `amount` unchanged when both codes are the same. A rate missing
/// from the snapshot counts as `1.0`, so the result degrades to an
/// approximation instead of failing.
pub fn convert(amount: f64, from: &str, to: &str, snapshot: &RateSnapshot) -> f64 {
    if from.eq_ignore_ascii_case(to) {
        return amount;
    }

    let from_rate = snapshot.rate(from).unwrap_or(1.0);
    let to_rate = snapshot.rate(to).unwrap_or(1.0);
    amount / from_rate * to_rate
}

/// Units of `to` per one unit of `from`, or `None` if either rate is missing.
pub fn rate_between(from: &str, to: &str, snapshot: &RateSnapshot) -> Option<f64> {
    if from.eq_ignore_ascii_case(to) {
        return Some(1.0);
    }
    Some(snapshot.rate(to)? / snapshot.rate(from)?)
}
