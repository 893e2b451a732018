//! Market axis: the top-N markets of a reference week plus "ROW" and "Total".
//!
//! The axis is ranked once per run and then reused for every window, so a
//! report keeps the same market columns even when another week would rank
//! the markets differently.

use super::calendar::WindowSpec;
use super::metrics::MetricsAggregator;
use super::record::MarketCode;
use super::scope::MarketScope;
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_TOP_MARKETS: usize = 15;
pub const REST_OF_WORLD: &str = "ROW";
pub const TOTAL: &str = "Total";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MarketLabel {
    Market(MarketCode),
    RestOfWorld,
    Total,
}

impl fmt::Display for MarketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketLabel::Market(code) => write!(f, "{}", code),
            MarketLabel::RestOfWorld => f.write_str(REST_OF_WORLD),
            MarketLabel::Total => f.write_str(TOTAL),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarketAxis {
    reference_window: String,
    top: Vec<(MarketCode, f64)>,
    rest: Vec<(MarketCode, f64)>,
    row_revenue: f64,
    total_revenue: f64,
}

impl MarketAxis {
    pub fn reference_window(&self) -> &str {
        &self.reference_window
    }

    /// Ranked top markets with their reference-window revenue.
    pub fn ranking(&self) -> &[(MarketCode, f64)] {
        &self.top
    }

    pub fn top_markets(&self) -> Vec<&MarketCode> {
        self.top.iter().map(|(m, _)| m).collect()
    }

    /// Markets folded into ROW, ranked.
    pub fn rest_of_world(&self) -> &[(MarketCode, f64)] {
        &self.rest
    }

    pub fn top_revenue(&self) -> f64 {
        sum_revenue(&self.top)
    }

    pub fn row_revenue(&self) -> f64 {
        self.row_revenue
    }

    /// Top-N revenue plus ROW revenue.
    pub fn total_revenue(&self) -> f64 {
        self.total_revenue
    }

    /// Top markets in rank order, then ROW, then Total.
    pub fn labels(&self) -> Vec<MarketLabel> {
        self.top
            .iter()
            .map(|(m, _)| MarketLabel::Market(m.clone()))
            .chain([MarketLabel::RestOfWorld, MarketLabel::Total])
            .collect()
    }

    pub fn scope(&self, label: &MarketLabel) -> MarketScope {
        match label {
            MarketLabel::Market(code) => MarketScope::Only(code.clone()),
            MarketLabel::RestOfWorld => {
                MarketScope::RestOf(self.top.iter().map(|(m, _)| m.clone()).collect())
            }
            MarketLabel::Total => MarketScope::All,
        }
    }

    pub fn contains(&self, market: &MarketCode) -> bool {
        self.top.iter().any(|(m, _)| m == market)
    }
}

fn sum_revenue(markets: &[(MarketCode, f64)]) -> f64 {
    markets.iter().map(|(_, r)| r).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketClassifier {
    top_n: usize,
}

impl Default for MarketClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_MARKETS)
    }
}

impl MarketClassifier {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Rank markets by online gross revenue in `reference`.
    pub fn classify(&self, aggregator: &MetricsAggregator<'_>, reference: &WindowSpec) -> MarketAxis {
        let revenue = aggregator.online_revenue_by_market(reference);
        let axis = self.classify_revenue(reference.label(), revenue);
        tracing::debug!(
            reference = reference.label(),
            top = axis.top.len(),
            rest = axis.rest.len(),
            total = axis.total_revenue,
            "classified markets"
        );
        axis
    }

    /// Rank precomputed revenue figures. Ties are broken by market name.
    pub fn classify_revenue(
        &self,
        reference_label: &str,
        revenue: BTreeMap<MarketCode, f64>,
    ) -> MarketAxis {
        let mut ranked: Vec<(MarketCode, f64)> = revenue.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let split = self.top_n.min(ranked.len());
        let rest = ranked.split_off(split);
        let row_revenue = sum_revenue(&rest);
        let total_revenue = sum_revenue(&ranked) + row_revenue;

        MarketAxis {
            reference_window: reference_label.to_string(),
            top: ranked,
            rest,
            row_revenue,
            total_revenue,
        }
    }
}
