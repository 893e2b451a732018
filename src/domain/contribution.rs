//! Weekly contribution of new and returning customers after acquisition cost.

use super::calendar::WindowSpec;
use super::growth::ratio;
use super::metrics::{Metric, MetricsAggregator};
use super::scope::MarketScope;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Contribution {
    pub window_label: String,
    pub gm2: f64,
    pub new_cac: f64,
    pub returning_cac: f64,
    pub new_customers: f64,
    pub new: f64,
    pub returning: f64,
    pub total: f64,
}

/// Contribution for a week window, or `None` when the gross margin table has
/// no GM2 value for the window's ISO week.
///
/// Spend is split between the segments by the aggregator's new-customer
/// weight; each segment contributes `(GM2 * AOV - CAC) * customers`.
pub fn contribution(aggregator: &MetricsAggregator<'_>, window: &WindowSpec) -> Option<Contribution> {
    let (iso_year, iso_week) = window.iso_year_week();
    let Some(gm2) = aggregator.data().gross_margin(iso_year, iso_week) else {
        tracing::warn!(
            window = window.label(),
            iso_year,
            iso_week,
            "no GM2 value for week; skipping contribution"
        );
        return None;
    };

    let m = aggregator.aggregate(window, &MarketScope::All);
    let spend = m.get(Metric::MarketingSpend);
    let new_customers = m.get(Metric::NewCustomers);
    let returning_customers = m.get(Metric::ReturningCustomers);
    let weight = aggregator.new_customer_spend_weight();

    let new_cac = ratio(weight * spend, new_customers);
    let returning_cac = ratio((1.0 - weight) * spend, returning_customers);
    let new = (gm2 * m.get(Metric::AovNew) - new_cac) * new_customers;
    let returning = (gm2 * m.get(Metric::AovReturning) - returning_cac) * returning_customers;

    Some(Contribution {
        window_label: window.label().to_string(),
        gm2,
        new_cac,
        returning_cac,
        new_customers,
        new,
        returning,
        total: new + returning,
    })
}

/// Contribution for each window that has a GM2 value.
pub fn contributions<'w>(
    aggregator: &MetricsAggregator<'_>,
    windows: impl IntoIterator<Item = &'w WindowSpec>,
) -> Vec<Contribution> {
    windows
        .into_iter()
        .filter_map(|w| contribution(aggregator, w))
        .collect()
}
