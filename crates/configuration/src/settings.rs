use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Semantic field holding the trade's close date/time.
pub const DATETIME_FIELD: &str = "datetime";
/// Semantic field holding the trade's profit or loss.
pub const PNL_FIELD: &str = "pnl";
/// Semantic field holding the optional trade identifier.
pub const TRADE_NUM_FIELD: &str = "trade_num";
/// Fields that must resolve to a column for an ingestion run to proceed.
pub const REQUIRED_FIELDS: [&str; 2] = [DATETIME_FIELD, PNL_FIELD];

/// The root configuration structure for the entire application.
///
/// Built once at startup and shared by reference afterwards; nothing mutates
/// it at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sheet name fragments, matched case-insensitively as substrings, in order.
    pub sheet_names: Vec<String>,
    /// Semantic field name -> exact header text expected in the first row.
    pub excel_columns: BTreeMap<String, String>,
    pub journal: JournalSettings,
    pub progress: ProgressSettings,
    pub logging: LoggingSettings,
}

/// Where ingestion snapshots are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    pub data_dir: PathBuf,
}

/// Controls when progress messages are emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// Inputs smaller than this many bytes are processed without progress messages.
    pub small_file_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Config {
    /// The header text configured for a semantic field, if any.
    pub fn header_for(&self, field: &str) -> Option<&str> {
        self.excel_columns.get(field).map(String::as_str)
    }

    /// Human-readable name of a field: its header text, or the field name itself.
    pub fn display_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.header_for(field).unwrap_or(field)
    }

    /// Checks the invariants the ingestion pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sheet_names.is_empty() {
            return Err(ConfigError::InvalidSheetNames(
                "at least one sheet name fragment is required",
            ));
        }
        if self.sheet_names.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidSheetNames("blank entries are not allowed"));
        }
        for field in REQUIRED_FIELDS {
            match self.header_for(field) {
                Some(header) if !header.trim().is_empty() => {}
                _ => {
                    return Err(ConfigError::MissingColumnMapping {
                        field: field.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let excel_columns = [
            (DATETIME_FIELD, "Date/Time"),
            (PNL_FIELD, "P&L USD"),
            (TRADE_NUM_FIELD, "Trade #"),
            ("type", "Type"),
        ]
        .into_iter()
        .map(|(field, header)| (field.to_string(), header.to_string()))
        .collect();

        Self {
            sheet_names: vec!["List of trades".to_string(), "list of trades".to_string()],
            excel_columns,
            journal: JournalSettings::default(),
            progress: ProgressSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("trading_data"),
        }
    }
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            small_file_bytes: 1024 * 1024,
        }
    }
}
