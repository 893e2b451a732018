//! Online revenue by gender and product category, as share of the week (SOB%).

use super::calendar::WindowSpec;
use super::dataset::ReportData;
use super::growth::{growth, share};
use super::record::{reporting_gender, Channel, ReportGender, TransactionRecord};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CategoryShareRow {
    pub category: String,
    pub revenue: f64,
    pub share: f64,
}

/// Category shares for one gender in one window. The denominator is the
/// online gross revenue of all genders in the window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CategoryShare {
    pub window_label: String,
    pub gender: ReportGender,
    pub rows: Vec<CategoryShareRow>,
    pub gender_revenue: f64,
    pub gender_share: f64,
    pub total_revenue: f64,
}

fn online_rows<'a>(
    data: &'a ReportData,
    window: &'a WindowSpec,
) -> impl Iterator<Item = &'a TransactionRecord> + 'a {
    data.transactions()
        .iter()
        .filter(move |r| r.channel == Channel::Online && window.contains(r.date))
}

/// Online gross revenue per category for one gender. Rows without a
/// category are left out.
pub fn category_revenue(
    data: &ReportData,
    window: &WindowSpec,
    gender: ReportGender,
) -> BTreeMap<String, f64> {
    let mut by_category = BTreeMap::new();
    for row in online_rows(data, window).filter(|r| reporting_gender(r.gender) == gender) {
        if let Some(category) = &row.category {
            *by_category.entry(category.clone()).or_insert(0.0) += row.gross_revenue;
        }
    }
    by_category
}

pub fn category_share(data: &ReportData, window: &WindowSpec, gender: ReportGender) -> CategoryShare {
    let total_revenue: f64 = online_rows(data, window).map(|r| r.gross_revenue).sum();
    let gender_revenue: f64 = online_rows(data, window)
        .filter(|r| reporting_gender(r.gender) == gender)
        .map(|r| r.gross_revenue)
        .sum();

    let rows = category_revenue(data, window, gender)
        .into_iter()
        .map(|(category, revenue)| CategoryShareRow {
            category,
            revenue,
            share: share(revenue, total_revenue),
        })
        .collect();

    CategoryShare {
        window_label: window.label().to_string(),
        gender,
        rows,
        gender_revenue,
        gender_share: share(gender_revenue, total_revenue),
        total_revenue,
    }
}

/// Category shares for both genders over a list of windows.
pub fn category_shares<'w>(
    data: &ReportData,
    windows: impl IntoIterator<Item = &'w WindowSpec>,
) -> Vec<CategoryShare> {
    windows
        .into_iter()
        .flat_map(|w| {
            [ReportGender::Men, ReportGender::Women]
                .into_iter()
                .map(move |g| category_share(data, w, g))
        })
        .collect()
}

/// Revenue growth per category between two windows. Categories present in
/// either window are listed; growth is 0 when the previous revenue is 0.
pub fn category_growth(
    data: &ReportData,
    current: &WindowSpec,
    previous: &WindowSpec,
    gender: ReportGender,
) -> Vec<(String, f64)> {
    let now = category_revenue(data, current, gender);
    let before = category_revenue(data, previous, gender);
    let mut categories: Vec<&String> = now.keys().chain(before.keys()).collect();
    categories.sort();
    categories.dedup();
    categories
        .into_iter()
        .map(|c| {
            let value = growth(
                now.get(c).copied().unwrap_or(0.0),
                before.get(c).copied(),
            );
            (c.clone(), value)
        })
        .collect()
}
