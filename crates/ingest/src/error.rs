use std::fmt;
use thiserror::Error;

/// A required field whose header could not be found in the first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    /// Semantic field name, e.g. `pnl`.
    pub field: String,
    /// The header text that was expected, e.g. `P&L USD`.
    pub header: String,
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)
    }
}

/// Errors that abort an ingestion run.
///
/// Problems with individual rows never surface here; those rows are skipped.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Sheet lookup failed: no sheet matches any of {fragments:?} (available: {available:?})")]
    SheetNotFound {
        fragments: Vec<String>,
        available: Vec<String>,
    },

    #[error("Header analysis failed: Missing required columns: {}", join(.fields))]
    MissingColumns { fields: Vec<MissingColumn> },

    #[error("Failed to read the trade source: {0}")]
    Source(#[from] workbook::WorkbookError),
}

impl IngestError {
    /// Semantic names of the missing required fields, if this is a header failure.
    pub fn missing_fields(&self) -> Vec<&str> {
        match self {
            IngestError::MissingColumns { fields } => {
                fields.iter().map(|f| f.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn join(fields: &[MissingColumn]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
