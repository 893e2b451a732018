//! Order deduplication for order counts.
//!
//! The sales export has one row per line item, so an order appears once per
//! product. Counting orders needs one row per order id; that row is chosen,
//! never built by merging. Its value fields describe a single line item only,
//! so revenue and returns must never be summed over the deduplicated rows.

use crate::domain::calendar::WindowSpec;
use crate::domain::record::{Channel, TransactionRecord};
use crate::domain::scope::MarketScope;
use std::collections::HashMap;

/// Order id used by the sales export for rows without an order.
pub const DEFAULT_INVALID_ORDER_ID: &str = "-";

/// Picks the row with the highest quantity; ties keep the earliest row.
pub fn select_representative<'a>(rows: &[&'a TransactionRecord]) -> Option<&'a TransactionRecord> {
    rows.iter()
        .copied()
        .reduce(|best, row| if row.qty > best.qty { row } else { best })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupSummary {
    pub filtered_rows: usize,
    pub duplicate_rows: usize,
    pub unique_orders: usize,
}

#[derive(Debug, Clone)]
pub struct OrderDeduplicator {
    invalid_id: String,
}

impl Default for OrderDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_INVALID_ORDER_ID)
    }
}

impl OrderDeduplicator {
    pub fn new(invalid_id: &str) -> Self {
        Self {
            invalid_id: invalid_id.to_string(),
        }
    }

    pub fn invalid_id(&self) -> &str {
        &self.invalid_id
    }

    fn is_valid_id(&self, order_id: &str) -> bool {
        let id = order_id.trim();
        !id.is_empty() && id != self.invalid_id
    }

    /// Rows in the window, channel and scope with a usable order id.
    pub fn filter<'a>(
        &self,
        records: &'a [TransactionRecord],
        window: &WindowSpec,
        channel: Channel,
        scope: &MarketScope,
    ) -> Vec<&'a TransactionRecord> {
        records
            .iter()
            .filter(|r| {
                window.contains(r.date)
                    && r.channel == channel
                    && scope.matches(&r.market)
                    && self.is_valid_id(&r.order_id)
            })
            .collect()
    }

    /// One representative row per order id, in order of each id's first
    /// appearance.
    pub fn deduplicate<'a>(
        &self,
        records: &'a [TransactionRecord],
        window: &WindowSpec,
        channel: Channel,
        scope: &MarketScope,
    ) -> Vec<&'a TransactionRecord> {
        let filtered = self.filter(records, window, channel, scope);

        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Vec<&TransactionRecord>> = Vec::new();
        for &row in &filtered {
            let slot = *slots.entry(row.order_id.trim()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(row);
        }

        let unique: Vec<&TransactionRecord> = groups
            .iter()
            .filter_map(|rows| select_representative(rows))
            .collect();

        let summary = DedupSummary {
            filtered_rows: filtered.len(),
            duplicate_rows: filtered.len() - unique.len(),
            unique_orders: unique.len(),
        };
        tracing::debug!(
            window = window.label(),
            channel = %channel,
            filtered_rows = summary.filtered_rows,
            duplicate_rows = summary.duplicate_rows,
            unique_orders = summary.unique_orders,
            "deduplicated orders"
        );

        unique
    }

    pub fn count_orders(
        &self,
        records: &[TransactionRecord],
        window: &WindowSpec,
        channel: Channel,
        scope: &MarketScope,
    ) -> usize {
        self.deduplicate(records, window, channel, scope).len()
    }

    pub fn summary(
        &self,
        records: &[TransactionRecord],
        window: &WindowSpec,
        channel: Channel,
        scope: &MarketScope,
    ) -> DedupSummary {
        let filtered_rows = self.filter(records, window, channel, scope).len();
        let unique_orders = self.count_orders(records, window, channel, scope);
        DedupSummary {
            filtered_rows,
            duplicate_rows: filtered_rows - unique_orders,
            unique_orders,
        }
    }
}
