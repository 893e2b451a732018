//! Market scopes: which rows of each table belong to a market slice.

use crate::domain::record::MarketCode;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketScope {
    All,
    Only(MarketCode),
    /// Every known market outside the given set. Rows without a market
    /// (possible in the session table) fall outside this scope.
    RestOf(BTreeSet<MarketCode>),
}

impl MarketScope {
    pub fn matches(&self, market: &MarketCode) -> bool {
        match self {
            MarketScope::All => true,
            MarketScope::Only(m) => m == market,
            MarketScope::RestOf(excluded) => !excluded.contains(market),
        }
    }

    pub fn matches_optional(&self, market: Option<&MarketCode>) -> bool {
        match (self, market) {
            (MarketScope::All, _) => true,
            (_, Some(m)) => self.matches(m),
            (_, None) => false,
        }
    }

    /// Slice key used in metric tables.
    pub fn key(&self) -> String {
        match self {
            MarketScope::All => "Total".to_string(),
            MarketScope::Only(m) => m.to_string(),
            MarketScope::RestOf(_) => "ROW".to_string(),
        }
    }
}
