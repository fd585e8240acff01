//! Summary statistics over per-trial wait times.
//!
//! - Empty input => `None` (or `0.0` for the `f64` wrappers).
//! - `percentile <= 0` => smallest value.
//! - `percentile >= 100` => largest value.
//! - Otherwise we compute a position within `[0, len-1]` and round to the
//!   nearest index.

/// Returns the percentile value from a slice that is already sorted in
/// ascending order.
pub fn value_sorted<T: Copy>(sorted_values: &[T], percentile: f64) -> Option<T> {
    if sorted_values.is_empty() {
        return None;
    }

    let index = if percentile <= 0.0 {
        0
    } else if percentile >= 100.0 {
        sorted_values.len() - 1
    } else {
        let position = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
        position.round() as usize
    };

    sorted_values.get(index).copied()
}

pub fn sorted(results: &[f64]) -> Vec<f64> {
    let mut values = results.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

/// Percentile of unordered results.
pub fn percentile(results: &[f64], percentile: f64) -> f64 {
    value_sorted(&sorted(results), percentile).unwrap_or(0.0)
}

/// Percentage (0-100) of results strictly below `years`.
pub fn probability_before(results: &[f64], years: f64) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let below = results.iter().filter(|value| **value < years).count();
    below as f64 / results.len() as f64 * 100.0
}

pub fn mean(results: &[f64]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().sum::<f64>() / results.len() as f64
}
