//! Data access port trait.

use crate::domain::error::ReportError;
use crate::domain::record::{GrossMarginRecord, SessionRecord, SpendRecord, TransactionRecord};

/// Source of the input tables.
///
/// Transactions are required. The other tables are optional sources:
/// `Ok(None)` means the source is not present, while `Err` means it is
/// present but unreadable or malformed.
pub trait ReportDataPort {
    fn load_transactions(&self) -> Result<Vec<TransactionRecord>, ReportError>;

    fn load_sessions(&self) -> Result<Option<Vec<SessionRecord>>, ReportError>;

    fn load_spend(&self) -> Result<Option<Vec<SpendRecord>>, ReportError>;

    fn load_gross_margins(&self) -> Result<Option<Vec<GrossMarginRecord>>, ReportError> {
        Ok(None)
    }
}
