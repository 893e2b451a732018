//! Loaded input tables, passed explicitly to every component.

use crate::domain::error::ReportError;
use crate::domain::record::{
    GrossMarginRecord, MarketCode, SessionRecord, SpendRecord, TransactionRecord,
};
use crate::ports::data_port::ReportDataPort;
use std::collections::BTreeSet;
use std::fmt;

/// Optional input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionalSource {
    Sessions,
    Spend,
    GrossMargins,
}

impl fmt::Display for OptionalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionalSource::Sessions => "sessions",
            OptionalSource::Spend => "spend",
            OptionalSource::GrossMargins => "gross margins",
        };
        f.write_str(name)
    }
}

/// Immutable tables for one reporting run.
///
/// A missing optional table behaves as an empty one, so the metrics that
/// depend on it come out as zero.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    transactions: Vec<TransactionRecord>,
    sessions: Option<Vec<SessionRecord>>,
    spend: Option<Vec<SpendRecord>>,
    gross_margins: Option<Vec<GrossMarginRecord>>,
}

impl ReportData {
    pub fn new(transactions: Vec<TransactionRecord>) -> Self {
        Self {
            transactions,
            ..Self::default()
        }
    }

    pub fn with_sessions(mut self, sessions: Vec<SessionRecord>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_spend(mut self, spend: Vec<SpendRecord>) -> Self {
        self.spend = Some(spend);
        self
    }

    pub fn with_gross_margins(mut self, gross_margins: Vec<GrossMarginRecord>) -> Self {
        self.gross_margins = Some(gross_margins);
        self
    }

    pub fn load(port: &dyn ReportDataPort) -> Result<Self, ReportError> {
        let transactions = port.load_transactions()?;
        tracing::info!(rows = transactions.len(), "loaded transactions");

        let data = Self {
            transactions,
            sessions: port.load_sessions()?,
            spend: port.load_spend()?,
            gross_margins: port.load_gross_margins()?,
        };

        for source in data.missing_sources() {
            tracing::warn!(%source, "optional source not present; dependent metrics will be zero");
        }
        Ok(data)
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        self.sessions.as_deref().unwrap_or_default()
    }

    pub fn spend(&self) -> &[SpendRecord] {
        self.spend.as_deref().unwrap_or_default()
    }

    pub fn gross_margins(&self) -> &[GrossMarginRecord] {
        self.gross_margins.as_deref().unwrap_or_default()
    }

    pub fn has_source(&self, source: OptionalSource) -> bool {
        match source {
            OptionalSource::Sessions => self.sessions.is_some(),
            OptionalSource::Spend => self.spend.is_some(),
            OptionalSource::GrossMargins => self.gross_margins.is_some(),
        }
    }

    pub fn missing_sources(&self) -> Vec<OptionalSource> {
        [
            OptionalSource::Sessions,
            OptionalSource::Spend,
            OptionalSource::GrossMargins,
        ]
        .into_iter()
        .filter(|s| !self.has_source(*s))
        .collect()
    }

    /// Distinct transaction markets, sorted.
    pub fn markets(&self) -> Vec<MarketCode> {
        let unique: BTreeSet<&MarketCode> = self.transactions.iter().map(|t| &t.market).collect();
        unique.into_iter().cloned().collect()
    }

    /// GM2 for an ISO week, if the gross margin table has one.
    pub fn gross_margin(&self, iso_year: i32, iso_week: u32) -> Option<f64> {
        self.gross_margins()
            .iter()
            .find(|g| g.iso_year == iso_year && g.iso_week == iso_week)
            .map(|g| g.gm2)
    }
}
