//! Growth and share-of-total.
//!
//! Every division here returns 0 when the denominator is 0 or not finite.
//! That is reporting policy ("n/m" in the slides), not an error.

use crate::domain::metrics::{Metric, MetricResult};

/// `numerator / denominator`, or 0.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

/// `numerator / denominator * 100`, or 0.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// Year-over-year (or period-over-period) growth in percent.
pub fn growth(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(prev) => percentage(current - prev, prev),
        None => 0.0,
    }
}

/// `value` as a percentage of the period total.
pub fn share(value: f64, total: f64) -> f64 {
    percentage(value, total)
}

/// Shares of each slice of a partition. The shares sum to 100 whenever the
/// total is non-zero.
pub fn shares<K: Clone>(values: &[(K, f64)]) -> Vec<(K, f64)> {
    let total: f64 = values.iter().map(|(_, v)| v).sum();
    values
        .iter()
        .map(|(k, v)| (k.clone(), share(*v, total)))
        .collect()
}

/// Growth of every metric of `current` against `previous`.
///
/// The result keeps the slice of `current` and takes `label` as its window.
pub fn growth_result(current: &MetricResult, previous: &MetricResult, label: &str) -> MetricResult {
    let mut out = MetricResult::zeroed(label, current.slice());
    for metric in Metric::ALL {
        out.set(metric, growth(current.get(metric), Some(previous.get(metric))));
    }
    out
}
