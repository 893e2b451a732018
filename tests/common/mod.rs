#![allow(dead_code)]

use chrono::NaiveDate;
use weekly_metrics::domain::error::ReportError;
use weekly_metrics::domain::record::{
    Channel, CustomerType, Gender, GrossMarginRecord, MarketCode, SessionRecord, SpendRecord,
    TransactionRecord,
};
use weekly_metrics::ports::data_port::ReportDataPort;

/// In-memory data port. Optional tables left as `None` behave like a missing
/// source; `transactions_error` makes the required load fail.
pub struct MockDataPort {
    pub transactions: Vec<TransactionRecord>,
    pub sessions: Option<Vec<SessionRecord>>,
    pub spend: Option<Vec<SpendRecord>>,
    pub gross_margins: Option<Vec<GrossMarginRecord>>,
    pub transactions_error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            sessions: None,
            spend: None,
            gross_margins: None,
            transactions_error: None,
        }
    }

    pub fn with_transactions(mut self, rows: Vec<TransactionRecord>) -> Self {
        self.transactions = rows;
        self
    }

    pub fn with_sessions(mut self, rows: Vec<SessionRecord>) -> Self {
        self.sessions = Some(rows);
        self
    }

    pub fn with_spend(mut self, rows: Vec<SpendRecord>) -> Self {
        self.spend = Some(rows);
        self
    }

    pub fn with_gross_margins(mut self, rows: Vec<GrossMarginRecord>) -> Self {
        self.gross_margins = Some(rows);
        self
    }

    pub fn with_transactions_error(mut self, reason: &str) -> Self {
        self.transactions_error = Some(reason.to_string());
        self
    }
}

impl ReportDataPort for MockDataPort {
    fn load_transactions(&self) -> Result<Vec<TransactionRecord>, ReportError> {
        if let Some(reason) = &self.transactions_error {
            return Err(ReportError::Source {
                table: "transactions".to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.transactions.clone())
    }

    fn load_sessions(&self) -> Result<Option<Vec<SessionRecord>>, ReportError> {
        Ok(self.sessions.clone())
    }

    fn load_spend(&self) -> Result<Option<Vec<SpendRecord>>, ReportError> {
        Ok(self.spend.clone())
    }

    fn load_gross_margins(&self) -> Result<Option<Vec<GrossMarginRecord>>, ReportError> {
        Ok(self.gross_margins.clone())
    }
}

/// Routes library logs to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn market(name: &str) -> MarketCode {
    MarketCode::new(name).unwrap()
}

/// Online line item with a customer.
pub fn online(
    day: NaiveDate,
    order: &str,
    customer: &str,
    kind: CustomerType,
    market_name: &str,
    gross: f64,
) -> TransactionRecord {
    TransactionRecord {
        date: day,
        channel: Channel::Online,
        order_id: order.to_string(),
        customer_id: Some(customer.to_string()),
        customer_type: Some(kind),
        market: market(market_name),
        gender: Some(Gender::Women),
        category: Some("TEES".to_string()),
        product: "Tee".to_string(),
        color: "Black".to_string(),
        gross_revenue: gross,
        returns: 0.0,
        qty: 1,
    }
}

pub fn line_item(
    day: NaiveDate,
    channel: Channel,
    order: &str,
    market_name: &str,
    gross: f64,
    qty: i64,
) -> TransactionRecord {
    TransactionRecord {
        channel,
        qty,
        customer_id: None,
        customer_type: None,
        ..online(day, order, "", CustomerType::New, market_name, gross)
    }
}

pub fn sessions(day: NaiveDate, market_name: Option<&str>, count: u64) -> SessionRecord {
    SessionRecord {
        date: day,
        market: market_name.map(market),
        sessions: count,
    }
}

pub fn spend(day: NaiveDate, market_name: &str, amount: f64) -> SpendRecord {
    SpendRecord {
        date: day,
        market: market(market_name),
        total_spend: amount,
    }
}
