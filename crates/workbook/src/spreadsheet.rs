use crate::{Workbook, WorkbookError};
use calamine::{Data, DataType, Reader, Xlsx, open_workbook};
use core_types::{CellValue, Row};
use std::path::{Path, PathBuf};

/// File extensions read by [`XlsxWorkbook`].
pub const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// An Excel workbook read through `calamine`.
///
/// Cells keep the types the workbook stores: numbers stay numeric and cells
/// formatted as dates come back as native date/times. Values are the cached
/// results of formulas, never the formulas themselves.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    path: PathBuf,
    sheet_names: Vec<String>,
}

impl XlsxWorkbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref().to_path_buf();
        let workbook: Xlsx<_> = open_workbook(&path)?;
        let sheet_names = workbook.sheet_names();

        tracing::debug!(path = %path.display(), sheets = sheet_names.len(), "Opened Excel workbook.");
        Ok(Self { path, sheet_names })
    }
}

impl Workbook for XlsxWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.clone()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Row>, WorkbookError> {
        if !self.sheet_names.iter().any(|name| name == sheet) {
            return Err(WorkbookError::SheetMissing(sheet.to_string()));
        }

        // The reader needs `&mut`, so each sheet read reopens the file.
        let mut workbook: Xlsx<_> = open_workbook(&self.path)?;
        let range = workbook.worksheet_range(sheet)?;

        // A range starts at its first used cell; pad back to A1 so row and
        // column positions match the sheet.
        let (first_row, first_column) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Row> = (0..first_row).map(|_| Vec::new()).collect();
        for cells in range.rows() {
            let mut row: Row = vec![CellValue::Empty; first_column as usize];
            row.extend(cells.iter().map(convert_cell));
            rows.push(row);
        }
        Ok(rows)
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::Text(cell.to_string()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}
