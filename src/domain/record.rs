//! Input record types and the validated labels they carry.
//!
//! Every free-text label from a source table is mapped to one of these types
//! at the ingestion boundary. Unknown labels are rejected there, so nothing
//! downstream ever matches on raw strings.

use crate::domain::error::ReportError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Placeholder the sales export writes into cells that have no value
/// (customer e-mail, gender, category, product, color).
pub const MISSING_VALUE: &str = "-";

/// True for empty cells and the export's `-` placeholder.
pub fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == MISSING_VALUE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Channel {
    Online,
    /// Concept stores.
    Retail,
    RetailPopUp,
    Wholesale,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Online,
        Channel::Retail,
        Channel::RetailPopUp,
        Channel::Wholesale,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Online => "Online",
            Channel::Retail => "Retail",
            Channel::RetailPopUp => "Retail Pop-up",
            Channel::Wholesale => "Wholesale",
        }
    }
}

impl FromStr for Channel {
    type Err = ReportError;

    /// Exact label match; "retail" or "Retail Pop-Up" are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.label() == s.trim())
            .ok_or_else(|| ReportError::InvalidLabel {
                value: s.to_string(),
                reason: "unknown sales channel".to_string(),
            })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CustomerType {
    New,
    Returning,
}

impl CustomerType {
    pub fn label(&self) -> &'static str {
        match self {
            CustomerType::New => "New",
            CustomerType::Returning => "Returning",
        }
    }
}

impl FromStr for CustomerType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "New" => Ok(CustomerType::New),
            "Returning" => Ok(CustomerType::Returning),
            other => Err(ReportError::InvalidLabel {
                value: other.to_string(),
                reason: "customer type must be New or Returning".to_string(),
            }),
        }
    }
}

/// Product gender as labelled in the sales export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Gender {
    Men,
    Women,
    Unisex,
    Kids,
    /// Three-pack products, labelled "3 X".
    ThreePack,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Men => "MEN",
            Gender::Women => "WOMEN",
            Gender::Unisex => "UNISEX",
            Gender::Kids => "KIDS",
            Gender::ThreePack => "3 X",
        }
    }
}

impl FromStr for Gender {
    type Err = ReportError;

    /// Case-insensitive, whitespace-trimmed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MEN" => Ok(Gender::Men),
            "WOMEN" => Ok(Gender::Women),
            "UNISEX" => Ok(Gender::Unisex),
            "KIDS" => Ok(Gender::Kids),
            "3 X" => Ok(Gender::ThreePack),
            _ => Err(ReportError::InvalidLabel {
                value: s.to_string(),
                reason: "unknown gender".to_string(),
            }),
        }
    }
}

/// The two genders that appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ReportGender {
    Men,
    Women,
}

impl ReportGender {
    pub fn label(&self) -> &'static str {
        match self {
            ReportGender::Men => "Men",
            ReportGender::Women => "Women",
        }
    }
}

/// Unisex, kids and three-pack products, and rows with no gender at all,
/// are reported under men.
pub fn reporting_gender(gender: Option<Gender>) -> ReportGender {
    match gender {
        Some(Gender::Women) => ReportGender::Women,
        Some(Gender::Men | Gender::Unisex | Gender::Kids | Gender::ThreePack) | None => {
            ReportGender::Men
        }
    }
}

/// A market (country) label, trimmed and non-empty.
///
/// "ROW" and "Total" are reserved for the synthetic columns of a market axis
/// and are rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarketCode(String);

impl MarketCode {
    pub fn new(value: &str) -> Result<Self, ReportError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ReportError::InvalidLabel {
                value: value.to_string(),
                reason: "market must not be empty".to_string(),
            });
        }
        if trimmed.eq_ignore_ascii_case("ROW") || trimmed.eq_ignore_ascii_case("Total") {
            return Err(ReportError::InvalidLabel {
                value: value.to_string(),
                reason: "market label is reserved".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line item of the sales export.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub channel: Channel,
    pub order_id: String,
    pub customer_id: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub market: MarketCode,
    pub gender: Option<Gender>,
    /// Upper-cased product category.
    pub category: Option<String>,
    pub product: String,
    pub color: String,
    pub gross_revenue: f64,
    pub returns: f64,
    pub qty: i64,
}

/// Sessions for one day and country, already aggregated by the analytics export.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub date: NaiveDate,
    pub market: Option<MarketCode>,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpendRecord {
    pub date: NaiveDate,
    pub market: MarketCode,
    pub total_spend: f64,
}

/// Gross margin 2 ratio for one ISO week.
#[derive(Debug, Clone, PartialEq)]
pub struct GrossMarginRecord {
    pub iso_year: i32,
    pub iso_week: u32,
    pub gm2: f64,
}
