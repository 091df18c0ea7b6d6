use crate::error::IngestError;
use crate::progress::ProgressSink;
use configuration::Config;
use workbook::Workbook;

/// Finds the sheet holding the trade list.
///
/// Sheets are tried in the order the workbook lists them; a sheet matches when
/// its name contains any configured fragment, ignoring case.
pub fn find_trades_sheet<W: Workbook + ?Sized>(
    workbook: &W,
    config: &Config,
    sink: &dyn ProgressSink,
) -> Result<String, IngestError> {
    let available = workbook.sheet_names();
    let fragments: Vec<String> = config.sheet_names.iter().map(|f| f.to_lowercase()).collect();

    for sheet_name in &available {
        let lowered = sheet_name.to_lowercase();
        if fragments.iter().any(|fragment| lowered.contains(fragment.as_str())) {
            sink.report(&format!("Found sheet: '{sheet_name}'"));
            tracing::debug!(sheet = %sheet_name, "Trades sheet located.");
            return Ok(sheet_name.clone());
        }
    }

    Err(IngestError::SheetNotFound {
        fragments: config.sheet_names.clone(),
        available,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use workbook::MemoryWorkbook;

    fn config_with(fragments: &[&str]) -> Config {
        Config {
            sheet_names: fragments.iter().map(|f| f.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn matches_substring_of_later_sheet() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Summary", vec![])
            .with_sheet("List of trades Q1", vec![]);
        let sheet = find_trades_sheet(&workbook, &config_with(&["List of trades"]), &NoProgress);
        assert_eq!(sheet.unwrap(), "List of trades Q1");
    }

    #[test]
    fn matching_ignores_case() {
        let workbook = MemoryWorkbook::new().with_sheet("LIST OF TRADES", vec![]);
        let sheet = find_trades_sheet(&workbook, &config_with(&["list of trades"]), &NoProgress);
        assert_eq!(sheet.unwrap(), "LIST OF TRADES");
    }

    #[test]
    fn first_listed_sheet_wins() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Closed trades", vec![])
            .with_sheet("List of trades", vec![]);
        let config = config_with(&["List of trades", "trades"]);
        let sheet = find_trades_sheet(&workbook, &config, &NoProgress);
        assert_eq!(sheet.unwrap(), "Closed trades");
    }

    #[test]
    fn no_match_is_fatal() {
        let workbook = MemoryWorkbook::new().with_sheet("Summary", vec![]);
        let err = find_trades_sheet(&workbook, &config_with(&["List of trades"]), &NoProgress)
            .unwrap_err();
        match err {
            IngestError::SheetNotFound { fragments, available } => {
                assert_eq!(fragments, vec!["List of trades"]);
                assert_eq!(available, vec!["Summary"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
