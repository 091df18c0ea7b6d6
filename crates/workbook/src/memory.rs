use crate::{Workbook, WorkbookError};
use core_types::Row;

/// A workbook held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, Vec<Row>)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet. Sheets keep their insertion order.
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.add_sheet(name, rows);
        self
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        self.sheets.push((name.into(), rows));
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Row>, WorkbookError> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| WorkbookError::SheetMissing(sheet.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::CellValue;

    #[test]
    fn sheets_keep_insertion_order() {
        let workbook = MemoryWorkbook::new()
            .with_sheet("Summary", vec![])
            .with_sheet("List of trades", vec![vec![CellValue::from("Date/Time")]]);

        assert_eq!(workbook.sheet_names(), vec!["Summary", "List of trades"]);
        assert_eq!(workbook.rows("List of trades").unwrap().len(), 1);
        assert!(matches!(
            workbook.rows("Missing"),
            Err(WorkbookError::SheetMissing(name)) if name == "Missing"
        ));
    }
}
