//! Report tables built on a fixed market axis.

use super::calendar::{FiscalYtd, WeekComparison, WindowSpec};
use super::growth::{growth_result, percentage, shares};
use super::markets::{MarketAxis, MarketLabel};
use super::metrics::{MetricTable, MetricsAggregator};
use super::scope::MarketScope;

pub const WEEK_OVER_WEEK: &str = "wow";
pub const YEAR_OVER_YEAR: &str = "yoy";
pub const TWO_YEAR_GROWTH: &str = "vs_two_years_back";
pub const YTD_GROWTH_LAST_YEAR: &str = "ytd_growth_last_year";
pub const YTD_GROWTH_TWO_YEARS_BACK: &str = "ytd_growth_two_years_back";

/// Metrics for every axis label in every window.
///
/// The axis is not re-ranked per window. A label with no rows in a window
/// still gets an all-zero result.
pub fn market_report<'w>(
    aggregator: &MetricsAggregator<'_>,
    axis: &MarketAxis,
    windows: impl IntoIterator<Item = &'w WindowSpec>,
) -> MetricTable {
    let labels = axis.labels();
    let scopes: Vec<MarketScope> = labels.iter().map(|l| axis.scope(l)).collect();

    let mut table = MetricTable::new();
    for window in windows {
        for scope in &scopes {
            table.insert(aggregator.aggregate(window, scope));
        }
    }
    table
}

/// Online gross revenue share of each top market and ROW in `window`.
///
/// Total is left out; the returned shares sum to 100 unless the window has
/// no online revenue, in which case they are all 0.
pub fn market_shares(
    aggregator: &MetricsAggregator<'_>,
    axis: &MarketAxis,
    window: &WindowSpec,
) -> Vec<(MarketLabel, f64)> {
    let revenue: Vec<(MarketLabel, f64)> = axis
        .labels()
        .into_iter()
        .filter(|l| *l != MarketLabel::Total)
        .map(|l| {
            let value = aggregator.online_gross_revenue(window, &axis.scope(&l));
            (l, value)
        })
        .collect();
    shares(&revenue)
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConversionRow {
    pub window_label: String,
    pub market: MarketLabel,
    pub sessions: f64,
    pub orders: f64,
    pub conversion_rate: f64,
}

/// Conversion rate per axis label per window, ordered by window then label.
pub fn conversion_by_market<'w>(
    aggregator: &MetricsAggregator<'_>,
    axis: &MarketAxis,
    windows: impl IntoIterator<Item = &'w WindowSpec>,
) -> Vec<ConversionRow> {
    let labels = axis.labels();
    let mut rows = Vec::new();
    for window in windows {
        for label in &labels {
            let scope = axis.scope(label);
            let sessions = aggregator.sessions(window, &scope);
            let orders = aggregator.online_orders(window, &scope) as f64;
            rows.push(ConversionRow {
                window_label: window.label().to_string(),
                market: label.clone(),
                sessions,
                orders,
                conversion_rate: percentage(orders, sessions),
            });
        }
    }
    rows
}

/// The four comparison weeks for one scope, plus week-over-week, year-over-year
/// and two-year growth rows.
pub fn week_comparison_report(
    aggregator: &MetricsAggregator<'_>,
    weeks: &WeekComparison,
    scope: &MarketScope,
) -> MetricTable {
    let current = aggregator.aggregate(&weeks.current_week, scope);
    let last_week = aggregator.aggregate(&weeks.last_week, scope);
    let last_year = aggregator.aggregate(&weeks.last_year, scope);
    let two_years_back = aggregator.aggregate(&weeks.two_years_back, scope);

    let mut table = MetricTable::new();
    table.insert(growth_result(&current, &last_week, WEEK_OVER_WEEK));
    table.insert(growth_result(&current, &last_year, YEAR_OVER_YEAR));
    table.insert(growth_result(&current, &two_years_back, TWO_YEAR_GROWTH));
    for result in [current, last_week, last_year, two_years_back] {
        table.insert(result);
    }
    table
}

/// Fiscal year-to-date metrics for one scope with growth against the same
/// span one and two years back.
pub fn ytd_growth(
    aggregator: &MetricsAggregator<'_>,
    ytd: &FiscalYtd,
    scope: &MarketScope,
) -> MetricTable {
    let current = aggregator.aggregate(&ytd.current, scope);
    let last_year = aggregator.aggregate(&ytd.last_year, scope);
    let two_years_back = aggregator.aggregate(&ytd.two_years_back, scope);

    let mut table = MetricTable::new();
    let vs_last_year = growth_result(&current, &last_year, YTD_GROWTH_LAST_YEAR);
    let vs_two_years = growth_result(&current, &two_years_back, YTD_GROWTH_TWO_YEARS_BACK);
    for result in [current, last_year, two_years_back, vs_last_year, vs_two_years] {
        table.insert(result);
    }
    table
}
