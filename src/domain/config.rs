//! Report configuration, read from a [`ConfigPort`] and validated up front.

use crate::domain::calendar::CalendarWindowResolver;
use crate::domain::dataset::ReportData;
use crate::domain::dedup::{OrderDeduplicator, DEFAULT_INVALID_ORDER_ID};
use crate::domain::error::ReportError;
use crate::domain::markets::{MarketClassifier, DEFAULT_TOP_MARKETS};
use crate::domain::metrics::{MetricsAggregator, NEW_CUSTOMER_SPEND_WEIGHT};
use crate::domain::record::MarketCode;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Input file locations from the `[data]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub transactions: PathBuf,
    pub sessions: Option<PathBuf>,
    pub spend: Option<PathBuf>,
    pub gross_margin: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub reference_date: Option<NaiveDate>,
    pub invalid_order_id: String,
    pub top_n: usize,
    /// Session-country label to market code.
    pub aliases: BTreeMap<String, MarketCode>,
    pub new_customer_spend_weight: f64,
    pub data: DataPaths,
}

impl ReportConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ReportError> {
        Ok(Self {
            reference_date: read_reference_date(config)?,
            invalid_order_id: read_invalid_order_id(config),
            top_n: read_top_n(config)?,
            aliases: match config.get_string("markets", "aliases") {
                Some(raw) => parse_aliases(&raw)?,
                None => BTreeMap::new(),
            },
            new_customer_spend_weight: read_spend_weight(config)?,
            data: read_data_paths(config)?,
        })
    }

    /// Resolver for the configured reference date, or today.
    pub fn resolver(&self) -> CalendarWindowResolver {
        match self.reference_date {
            Some(date) => CalendarWindowResolver::new(date),
            None => CalendarWindowResolver::today(),
        }
    }

    pub fn deduplicator(&self) -> OrderDeduplicator {
        OrderDeduplicator::new(&self.invalid_order_id)
    }

    pub fn classifier(&self) -> MarketClassifier {
        MarketClassifier::new(self.top_n)
    }

    pub fn aggregator<'a>(&self, data: &'a ReportData) -> MetricsAggregator<'a> {
        MetricsAggregator::new(data)
            .with_deduplicator(self.deduplicator())
            .with_new_customer_spend_weight(self.new_customer_spend_weight)
    }
}

/// Market code for a session-country or spend-market label, through the
/// alias table.
pub fn market_for_label(
    aliases: &BTreeMap<String, MarketCode>,
    label: &str,
) -> Result<MarketCode, ReportError> {
    match aliases.get(label.trim()) {
        Some(code) => Ok(code.clone()),
        None => MarketCode::new(label),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ReportError {
    ReportError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_reference_date(config: &dyn ConfigPort) -> Result<Option<NaiveDate>, ReportError> {
    match non_empty(config, "report", "reference_date") {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid("report", "reference_date", "expected YYYY-MM-DD")),
    }
}

fn read_invalid_order_id(config: &dyn ConfigPort) -> String {
    non_empty(config, "report", "invalid_order_id")
        .unwrap_or_else(|| DEFAULT_INVALID_ORDER_ID.to_string())
}

/// An unparsable value reads as 0 and is rejected with the out-of-range case.
fn read_top_n(config: &dyn ConfigPort) -> Result<usize, ReportError> {
    if non_empty(config, "markets", "top_n").is_none() {
        return Ok(DEFAULT_TOP_MARKETS);
    }
    let value = config.get_int("markets", "top_n", 0);
    usize::try_from(value)
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| invalid("markets", "top_n", "top_n must be a positive integer"))
}

fn read_spend_weight(config: &dyn ConfigPort) -> Result<f64, ReportError> {
    if non_empty(config, "metrics", "new_customer_spend_weight").is_none() {
        return Ok(NEW_CUSTOMER_SPEND_WEIGHT);
    }
    let value = config.get_double("metrics", "new_customer_spend_weight", f64::NAN);
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(
            "metrics",
            "new_customer_spend_weight",
            "new_customer_spend_weight must be between 0 and 1",
        ))
    }
}

fn read_data_paths(config: &dyn ConfigPort) -> Result<DataPaths, ReportError> {
    let transactions = non_empty(config, "data", "transactions").ok_or_else(|| {
        ReportError::ConfigMissing {
            section: "data".to_string(),
            key: "transactions".to_string(),
        }
    })?;
    let optional = |key: &str| non_empty(config, "data", key).map(PathBuf::from);
    Ok(DataPaths {
        transactions: PathBuf::from(transactions),
        sessions: optional("sessions"),
        spend: optional("spend"),
        gross_margin: optional("gross_margin"),
    })
}

/// Parses `"Session Name:CODE, Other:CODE2"`.
pub fn parse_aliases(raw: &str) -> Result<BTreeMap<String, MarketCode>, ReportError> {
    let mut aliases = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((label, code)) = entry.rsplit_once(':') else {
            return Err(invalid(
                "markets",
                "aliases",
                format!("expected label:market, got {:?}", entry),
            ));
        };
        let label = label.trim();
        if label.is_empty() {
            return Err(invalid("markets", "aliases", format!("empty label in {:?}", entry)));
        }
        let code = MarketCode::new(code)
            .map_err(|e| invalid("markets", "aliases", e.to_string()))?;
        aliases.insert(label.to_string(), code);
    }
    Ok(aliases)
}
