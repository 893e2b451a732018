//! Domain error types.

/// Top-level error type for weekly_metrics.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("{table}: missing required column(s): {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("{table} row {row}: invalid {column} value {value:?}: {reason}")]
    DataQuality {
        table: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("failed to read {table}: {reason}")]
    Source { table: String, reason: String },

    #[error("invalid reference date {value:?}: expected YYYY-MM-DD")]
    InvalidReferenceDate { value: String },

    #[error("invalid window {label}: {reason}")]
    InvalidWindow { label: String, reason: String },

    #[error("invalid label {value:?}: {reason}")]
    InvalidLabel { value: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },
}

impl ReportError {
    pub(crate) fn data_quality(
        table: &str,
        row: usize,
        column: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        ReportError::DataQuality {
            table: table.to_string(),
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
