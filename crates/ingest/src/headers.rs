use crate::error::{IngestError, MissingColumn};
use crate::progress::ProgressSink;
use configuration::{Config, DATETIME_FIELD, PNL_FIELD, REQUIRED_FIELDS, TRADE_NUM_FIELD};
use core_types::CellValue;
use std::collections::BTreeMap;

/// Column positions resolved from a sheet's header row.
///
/// Only constructed once both required fields have a column, so the date and
/// P&L accessors are infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    columns: BTreeMap<String, usize>,
    datetime: usize,
    pnl: usize,
}

impl HeaderMap {
    pub fn datetime(&self) -> usize {
        self.datetime
    }

    pub fn pnl(&self) -> usize {
        self.pnl
    }

    /// Column of the trade identifier, when the sheet has one.
    pub fn trade_num(&self) -> Option<usize> {
        self.get(TRADE_NUM_FIELD)
    }

    pub fn get(&self, field: &str) -> Option<usize> {
        self.columns.get(field).copied()
    }

    /// Every resolved field, including ones the pipeline does not use.
    pub fn columns(&self) -> &BTreeMap<String, usize> {
        &self.columns
    }
}

/// Maps semantic field names to column indices using the first row of a sheet.
///
/// Header cells are trimmed and compared exactly (case-sensitive) against the
/// configured header texts. If the same header appears twice, the rightmost
/// column wins. Fails naming every required field that found no column.
pub fn resolve_headers(
    header_row: &[CellValue],
    config: &Config,
    sink: &dyn ProgressSink,
) -> Result<HeaderMap, IngestError> {
    let mut columns = BTreeMap::new();

    for (index, cell) in header_row.iter().enumerate() {
        if !cell.is_truthy() {
            continue;
        }
        let text = cell.to_text();
        let header = text.trim();

        if let Some((field, expected)) = config
            .excel_columns
            .iter()
            .find(|(_, expected)| expected.as_str() == header)
        {
            columns.insert(field.clone(), index);
            sink.report(&format!("Found {expected} column"));
        }
    }

    let missing: Vec<MissingColumn> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !columns.contains_key(**field))
        .map(|field| MissingColumn {
            field: field.to_string(),
            header: config.display_name(field).to_string(),
        })
        .collect();

    match (columns.get(DATETIME_FIELD), columns.get(PNL_FIELD)) {
        (Some(&datetime), Some(&pnl)) if missing.is_empty() => {
            tracing::debug!(?columns, "Header row resolved.");
            Ok(HeaderMap {
                columns,
                datetime,
                pnl,
            })
        }
        _ => Err(IngestError::MissingColumns { fields: missing }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    fn header_row(cells: &[&str]) -> Vec<CellValue> {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(*c)
                }
            })
            .collect()
    }

    #[test]
    fn resolves_configured_columns() {
        let row = header_row(&["Trade #", "Type", "", " Date/Time ", "P&L USD", "Extra"]);
        let headers = resolve_headers(&row, &Config::default(), &NoProgress).unwrap();

        assert_eq!(headers.trade_num(), Some(0));
        assert_eq!(headers.get("type"), Some(1));
        assert_eq!(headers.datetime(), 3);
        assert_eq!(headers.pnl(), 4);
        assert_eq!(headers.columns().len(), 4);
    }

    #[test]
    fn comparison_is_exact_and_case_sensitive() {
        let row = header_row(&["date/time", "P&L USD"]);
        let err = resolve_headers(&row, &Config::default(), &NoProgress).unwrap_err();
        assert_eq!(err.missing_fields(), vec!["datetime"]);

        let row = header_row(&["Date/Time (UTC)", "P&L USD"]);
        assert!(resolve_headers(&row, &Config::default(), &NoProgress).is_err());
    }

    #[test]
    fn missing_pnl_is_named() {
        let row = header_row(&["Trade #", "Date/Time"]);
        let err = resolve_headers(&row, &Config::default(), &NoProgress).unwrap_err();
        assert_eq!(err.missing_fields(), vec!["pnl"]);
        assert!(err.to_string().contains("Missing required columns: P&L USD"));
        assert!(!err.to_string().contains("Date/Time"));
    }

    #[test]
    fn every_missing_field_is_reported() {
        let err = resolve_headers(&[], &Config::default(), &NoProgress).unwrap_err();
        assert_eq!(err.missing_fields(), vec!["datetime", "pnl"]);
        assert!(err.to_string().contains("Date/Time, P&L USD"));
    }

    #[test]
    fn trade_num_is_optional() {
        let row = header_row(&["Date/Time", "P&L USD"]);
        let headers = resolve_headers(&row, &Config::default(), &NoProgress).unwrap();
        assert_eq!(headers.trade_num(), None);
    }

    #[test]
    fn duplicate_header_keeps_last_column() {
        let row = header_row(&["Date/Time", "P&L USD", "Date/Time"]);
        let headers = resolve_headers(&row, &Config::default(), &NoProgress).unwrap();
        assert_eq!(headers.datetime(), 2);
    }
}
