//! Channel-scoped business metrics for one window and market slice.
//!
//! Revenue and returns are summed over every line item. Order counts go
//! through [`OrderDeduplicator`]; the two are never mixed.

use super::calendar::WindowSpec;
use super::dataset::ReportData;
use super::dedup::OrderDeduplicator;
use super::growth::{percentage, ratio};
use super::record::{is_missing, Channel, CustomerType, MarketCode, TransactionRecord};
use super::scope::MarketScope;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Share of marketing spend attributed to acquiring new customers.
pub const NEW_CUSTOMER_SPEND_WEIGHT: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Metric {
    GrossRevenue,
    NetRevenue,
    Returns,
    ReturnRate,
    NewCustomers,
    ReturningCustomers,
    GrossRevenueNew,
    GrossRevenueReturning,
    AovNew,
    AovReturning,
    Sessions,
    OnlineOrders,
    ConversionRate,
    RetailConceptStoreRevenue,
    RetailPopUpRevenue,
    RetailNetRevenue,
    WholesaleRevenue,
    TotalNetRevenue,
    MarketingSpend,
    CostOfSale,
    NewCustomerAcquisitionCost,
}

impl Metric {
    pub const ALL: [Metric; 21] = [
        Metric::GrossRevenue,
        Metric::NetRevenue,
        Metric::Returns,
        Metric::ReturnRate,
        Metric::NewCustomers,
        Metric::ReturningCustomers,
        Metric::GrossRevenueNew,
        Metric::GrossRevenueReturning,
        Metric::AovNew,
        Metric::AovReturning,
        Metric::Sessions,
        Metric::OnlineOrders,
        Metric::ConversionRate,
        Metric::RetailConceptStoreRevenue,
        Metric::RetailPopUpRevenue,
        Metric::RetailNetRevenue,
        Metric::WholesaleRevenue,
        Metric::TotalNetRevenue,
        Metric::MarketingSpend,
        Metric::CostOfSale,
        Metric::NewCustomerAcquisitionCost,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::GrossRevenue => "online_gross_revenue",
            Metric::NetRevenue => "online_net_revenue",
            Metric::Returns => "returns",
            Metric::ReturnRate => "return_rate_pct",
            Metric::NewCustomers => "new_customers",
            Metric::ReturningCustomers => "returning_customers",
            Metric::GrossRevenueNew => "gross_revenue_new_customers",
            Metric::GrossRevenueReturning => "gross_revenue_returning_customers",
            Metric::AovNew => "aov_new_customers",
            Metric::AovReturning => "aov_returning_customers",
            Metric::Sessions => "sessions",
            Metric::OnlineOrders => "online_orders",
            Metric::ConversionRate => "conversion_rate_pct",
            Metric::RetailConceptStoreRevenue => "retail_concept_store_revenue",
            Metric::RetailPopUpRevenue => "retail_pop_up_revenue",
            Metric::RetailNetRevenue => "retail_net_revenue",
            Metric::WholesaleRevenue => "wholesale_revenue",
            Metric::TotalNetRevenue => "total_net_revenue",
            Metric::MarketingSpend => "marketing_spend",
            Metric::CostOfSale => "cost_of_sale_pct",
            Metric::NewCustomerAcquisitionCost => "ncac",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// Metric values for one window and one slice. Every metric is present.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MetricResult {
    window_label: String,
    slice: String,
    values: BTreeMap<Metric, f64>,
}

impl MetricResult {
    pub fn zeroed(window_label: &str, slice: &str) -> Self {
        Self {
            window_label: window_label.to_string(),
            slice: slice.to_string(),
            values: Metric::ALL.into_iter().map(|m| (m, 0.0)).collect(),
        }
    }

    pub fn window_label(&self) -> &str {
        &self.window_label
    }

    pub fn slice(&self) -> &str {
        &self.slice
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.values.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.values.insert(metric, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    pub fn is_zero(&self) -> bool {
        self.values.values().all(|v| *v == 0.0)
    }
}

/// Metric results keyed by `(window_label, slice, metric)`.
///
/// Windows and slices keep their first-insertion order so that downstream
/// tables get stable columns.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MetricTable {
    results: Vec<MetricResult>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<(String, String), usize>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result, replacing any earlier one for the same window and slice.
    pub fn insert(&mut self, result: MetricResult) {
        let key = (result.window_label.clone(), result.slice.clone());
        match self.index.get(&key) {
            Some(&i) => self.results[i] = result,
            None => {
                self.index.insert(key, self.results.len());
                self.results.push(result);
            }
        }
    }

    pub fn result(&self, window_label: &str, slice: &str) -> Option<&MetricResult> {
        self.index
            .get(&(window_label.to_string(), slice.to_string()))
            .map(|&i| &self.results[i])
    }

    pub fn get(&self, window_label: &str, slice: &str, metric: Metric) -> Option<f64> {
        self.result(window_label, slice).map(|r| r.get(metric))
    }

    pub fn results(&self) -> &[MetricResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn windows(&self) -> Vec<&str> {
        unique_in_order(self.results.iter().map(|r| r.window_label.as_str()))
    }

    pub fn slices(&self) -> Vec<&str> {
        unique_in_order(self.results.iter().map(|r| r.slice.as_str()))
    }

    /// Flattened `(window, slice, metric, value)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, Metric, f64)> + '_ {
        self.results.iter().flat_map(|r| {
            r.iter()
                .map(move |(m, v)| (r.window_label.as_str(), r.slice.as_str(), m, v))
        })
    }
}

fn unique_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items.filter(|s| seen.insert(*s)).collect()
}

pub struct MetricsAggregator<'a> {
    data: &'a ReportData,
    dedup: OrderDeduplicator,
    new_customer_spend_weight: f64,
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(data: &'a ReportData) -> Self {
        Self {
            data,
            dedup: OrderDeduplicator::default(),
            new_customer_spend_weight: NEW_CUSTOMER_SPEND_WEIGHT,
        }
    }

    pub fn with_deduplicator(mut self, dedup: OrderDeduplicator) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_new_customer_spend_weight(mut self, weight: f64) -> Self {
        self.new_customer_spend_weight = weight;
        self
    }

    pub fn data(&self) -> &'a ReportData {
        self.data
    }

    pub fn deduplicator(&self) -> &OrderDeduplicator {
        &self.dedup
    }

    pub fn new_customer_spend_weight(&self) -> f64 {
        self.new_customer_spend_weight
    }

    fn rows<'s>(
        &'s self,
        window: &'s WindowSpec,
        scope: &'s MarketScope,
        channel: Channel,
    ) -> impl Iterator<Item = &'a TransactionRecord> + 's {
        self.data
            .transactions()
            .iter()
            .filter(move |r| r.channel == channel && window.contains(r.date) && scope.matches(&r.market))
    }

    pub fn channel_gross_revenue(&self, window: &WindowSpec, scope: &MarketScope, channel: Channel) -> f64 {
        self.rows(window, scope, channel).map(|r| r.gross_revenue).sum()
    }

    pub fn online_gross_revenue(&self, window: &WindowSpec, scope: &MarketScope) -> f64 {
        self.channel_gross_revenue(window, scope, Channel::Online)
    }

    /// Online gross revenue of every market with online rows in the window.
    pub fn online_revenue_by_market(&self, window: &WindowSpec) -> BTreeMap<MarketCode, f64> {
        let all = MarketScope::All;
        let mut by_market: BTreeMap<MarketCode, f64> = BTreeMap::new();
        for row in self.rows(window, &all, Channel::Online) {
            *by_market.entry(row.market.clone()).or_insert(0.0) += row.gross_revenue;
        }
        by_market
    }

    pub fn sessions(&self, window: &WindowSpec, scope: &MarketScope) -> f64 {
        self.data
            .sessions()
            .iter()
            .filter(|s| window.contains(s.date) && scope.matches_optional(s.market.as_ref()))
            .map(|s| s.sessions as f64)
            .sum()
    }

    pub fn marketing_spend(&self, window: &WindowSpec, scope: &MarketScope) -> f64 {
        self.data
            .spend()
            .iter()
            .filter(|s| window.contains(s.date) && scope.matches(&s.market))
            .map(|s| s.total_spend)
            .sum()
    }

    pub fn online_orders(&self, window: &WindowSpec, scope: &MarketScope) -> usize {
        self.dedup
            .count_orders(self.data.transactions(), window, Channel::Online, scope)
    }

    pub fn aggregate(&self, window: &WindowSpec, scope: &MarketScope) -> MetricResult {
        let mut result = MetricResult::zeroed(window.label(), &scope.key());

        let mut gross = 0.0;
        let mut returns = 0.0;
        let mut new_ids: HashSet<&str> = HashSet::new();
        let mut returning_ids: HashSet<&str> = HashSet::new();
        let mut gross_new = 0.0;
        let mut gross_returning = 0.0;

        for row in self.rows(window, scope, Channel::Online) {
            gross += row.gross_revenue;
            returns += row.returns;

            let customer = row.customer_id.as_deref().map(str::trim).filter(|c| !is_missing(c));
            match (customer, row.customer_type) {
                (Some(id), Some(CustomerType::New)) => {
                    new_ids.insert(id);
                    gross_new += row.gross_revenue;
                }
                (Some(id), Some(CustomerType::Returning)) => {
                    returning_ids.insert(id);
                    gross_returning += row.gross_revenue;
                }
                _ => {}
            }
        }

        let new_customers = new_ids.len() as f64;
        let returning_customers = returning_ids.len() as f64;

        let sessions = self.sessions(window, scope);
        let orders = self.online_orders(window, scope) as f64;

        let concept_store = self.channel_gross_revenue(window, scope, Channel::Retail);
        let pop_up = self.channel_gross_revenue(window, scope, Channel::RetailPopUp);
        let wholesale = self.channel_gross_revenue(window, scope, Channel::Wholesale);
        let net = gross - returns;
        let retail_net = concept_store + pop_up;

        let spend = self.marketing_spend(window, scope);

        result.set(Metric::GrossRevenue, gross);
        result.set(Metric::NetRevenue, net);
        result.set(Metric::Returns, returns);
        result.set(Metric::ReturnRate, percentage(returns, gross));
        result.set(Metric::NewCustomers, new_customers);
        result.set(Metric::ReturningCustomers, returning_customers);
        result.set(Metric::GrossRevenueNew, gross_new);
        result.set(Metric::GrossRevenueReturning, gross_returning);
        result.set(Metric::AovNew, ratio(gross_new, new_customers));
        result.set(Metric::AovReturning, ratio(gross_returning, returning_customers));
        result.set(Metric::Sessions, sessions);
        result.set(Metric::OnlineOrders, orders);
        result.set(Metric::ConversionRate, percentage(orders, sessions));
        result.set(Metric::RetailConceptStoreRevenue, concept_store);
        result.set(Metric::RetailPopUpRevenue, pop_up);
        result.set(Metric::RetailNetRevenue, retail_net);
        result.set(Metric::WholesaleRevenue, wholesale);
        result.set(Metric::TotalNetRevenue, net + retail_net + wholesale);
        result.set(Metric::MarketingSpend, spend);
        result.set(Metric::CostOfSale, percentage(spend, gross));
        result.set(
            Metric::NewCustomerAcquisitionCost,
            ratio(self.new_customer_spend_weight * spend, new_customers),
        );

        result
    }
}
