//! Top online products of a week by gross revenue, for one customer segment.
//!
//! Line items are grouped by gender, category, product and color. Rows with
//! any of those missing (empty or `-`) are dropped before grouping, so the
//! segment total only covers identifiable products.

use super::calendar::WindowSpec;
use super::dataset::ReportData;
use super::growth::share;
use super::record::{
    is_missing, reporting_gender, Channel, CustomerType, Gender, ReportGender, TransactionRecord,
};
use std::collections::BTreeMap;

pub const TOP_PRODUCTS: usize = 20;

/// Which online line items a product ranking covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ProductSegment {
    Customers(CustomerType),
    Gender(ReportGender),
}

impl ProductSegment {
    fn includes(&self, row: &TransactionRecord) -> bool {
        match self {
            ProductSegment::Customers(kind) => row.customer_type == Some(*kind),
            ProductSegment::Gender(gender) => reporting_gender(row.gender) == *gender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProductKey {
    pub gender: Gender,
    pub category: String,
    pub product: String,
    pub color: String,
}

impl ProductKey {
    fn from_row(row: &TransactionRecord) -> Option<Self> {
        let gender = row.gender?;
        let category = row.category.as_deref().filter(|c| !is_missing(c))?;
        if is_missing(&row.product) || is_missing(&row.color) {
            return None;
        }
        Some(Self {
            gender,
            category: category.to_string(),
            product: row.product.trim().to_string(),
            color: row.color.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProductRow {
    /// 1-based.
    pub rank: usize,
    pub key: ProductKey,
    pub gross_revenue: f64,
    pub qty: i64,
    /// Share of the segment's gross revenue (SOB%).
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProductRanking {
    pub window_label: String,
    pub segment: ProductSegment,
    pub rows: Vec<ProductRow>,
    /// Sums over the ranked rows ("Top 20 Total").
    pub top_revenue: f64,
    pub top_qty: i64,
    pub top_share: f64,
    /// Sums over every grouped product in the segment.
    pub total_revenue: f64,
    pub total_qty: i64,
}

/// Gross revenue and quantity per product for the segment's online rows.
pub fn product_totals(
    data: &ReportData,
    window: &WindowSpec,
    segment: ProductSegment,
) -> BTreeMap<ProductKey, (f64, i64)> {
    let mut totals: BTreeMap<ProductKey, (f64, i64)> = BTreeMap::new();
    let rows = data
        .transactions()
        .iter()
        .filter(|r| r.channel == Channel::Online && window.contains(r.date) && segment.includes(r));
    for row in rows {
        let Some(key) = ProductKey::from_row(row) else {
            continue;
        };
        let entry = totals.entry(key).or_insert((0.0, 0));
        entry.0 += row.gross_revenue;
        entry.1 += row.qty;
    }
    totals
}

/// The `limit` best-selling products by gross revenue. Equal revenue is
/// ordered by gender, category, product and color.
pub fn top_products(
    data: &ReportData,
    window: &WindowSpec,
    segment: ProductSegment,
    limit: usize,
) -> ProductRanking {
    let totals = product_totals(data, window, segment);
    let total_revenue: f64 = totals.values().map(|(revenue, _)| revenue).sum();
    let total_qty: i64 = totals.values().map(|(_, qty)| qty).sum();

    let mut ranked: Vec<(ProductKey, (f64, i64))> = totals.into_iter().collect();
    // Stable sort keeps the key order among equal revenue.
    ranked.sort_by(|a, b| b.1.0.total_cmp(&a.1.0));
    ranked.truncate(limit);

    let rows: Vec<ProductRow> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, (key, (gross_revenue, qty)))| ProductRow {
            rank: i + 1,
            key,
            gross_revenue,
            qty,
            share: share(gross_revenue, total_revenue),
        })
        .collect();

    let top_revenue: f64 = rows.iter().map(|r| r.gross_revenue).sum();
    let top_qty: i64 = rows.iter().map(|r| r.qty).sum();
    tracing::debug!(
        window = window.label(),
        ?segment,
        products = rows.len(),
        top_revenue,
        total_revenue,
        "ranked products"
    );

    ProductRanking {
        window_label: window.label().to_string(),
        segment,
        rows,
        top_revenue,
        top_qty,
        top_share: share(top_revenue, total_revenue),
        total_revenue,
        total_qty,
    }
}

/// Rankings for new customers, returning customers, women and men.
pub fn product_rankings(data: &ReportData, window: &WindowSpec, limit: usize) -> Vec<ProductRanking> {
    [
        ProductSegment::Customers(CustomerType::New),
        ProductSegment::Customers(CustomerType::Returning),
        ProductSegment::Gender(ReportGender::Women),
        ProductSegment::Gender(ReportGender::Men),
    ]
    .into_iter()
    .map(|segment| top_products(data, window, segment, limit))
    .collect()
}
