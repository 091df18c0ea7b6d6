//! # Trade Calendar Workbooks
//!
//! Tabular sources the ingestion pipeline reads from. A workbook is a list of
//! named sheets; each sheet is a header row followed by data rows of typed
//! cells.
//!
//! - `MemoryWorkbook`: sheets assembled in code.
//! - `XlsxWorkbook`: an Excel `.xlsx`/`.xlsm` file.
//! - `CsvWorkbook`: a `.csv` file (one sheet) or a directory of them.
//!
//! `open_path` picks the reader from the file extension.

pub mod delimited;
pub mod error;
pub mod memory;
pub mod spreadsheet;

pub use delimited::{CsvWorkbook, infer_cell};
pub use error::WorkbookError;
pub use memory::MemoryWorkbook;
pub use spreadsheet::{SPREADSHEET_EXTENSIONS, XlsxWorkbook};

use core_types::Row;
use std::path::Path;

/// A collection of named sheets.
pub trait Workbook {
    /// Sheet names in the order the source lists them.
    fn sheet_names(&self) -> Vec<String>;

    /// Every row of the named sheet, header row first.
    fn rows(&self, sheet: &str) -> Result<Vec<Row>, WorkbookError>;
}

impl<W: Workbook + ?Sized> Workbook for &W {
    fn sheet_names(&self) -> Vec<String> {
        (**self).sheet_names()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Row>, WorkbookError> {
        (**self).rows(sheet)
    }
}

impl<W: Workbook + ?Sized> Workbook for Box<W> {
    fn sheet_names(&self) -> Vec<String> {
        (**self).sheet_names()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Row>, WorkbookError> {
        (**self).rows(sheet)
    }
}

/// Opens `path` with the reader its extension calls for: Excel files through
/// [`XlsxWorkbook`], everything else (including directories) as CSV.
pub fn open_path(path: &Path) -> Result<Box<dyn Workbook>, WorkbookError> {
    let is_spreadsheet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });

    if is_spreadsheet {
        Ok(Box::new(XlsxWorkbook::open(path)?))
    } else {
        Ok(Box::new(CsvWorkbook::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_path_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("trades.csv");
        std::fs::write(&csv, "a,b\n1,2\n").unwrap();
        assert_eq!(open_path(&csv).unwrap().sheet_names(), vec!["trades"]);

        // Not a zip archive, so only the Excel reader would reject it.
        let xlsx = dir.path().join("trades.XLSX");
        std::fs::write(&xlsx, "a,b\n1,2\n").unwrap();
        assert!(matches!(open_path(&xlsx), Err(WorkbookError::Xlsx(_))));
    }
}
