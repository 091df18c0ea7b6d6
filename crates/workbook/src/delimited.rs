use crate::{Workbook, WorkbookError};
use chrono::NaiveDateTime;
use core_types::{CellValue, Row};
use std::fs;
use std::path::{Path, PathBuf};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// A workbook backed by comma-separated files.
///
/// A single file is a workbook with one sheet named after the file stem. A
/// directory is a workbook whose sheets are its `.csv` files, in file-name order.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    sheets: Vec<(String, PathBuf)>,
}

impl CsvWorkbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|source| WorkbookError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let sheets = if metadata.is_file() {
            vec![(sheet_name(path), path.to_path_buf())]
        } else if metadata.is_dir() {
            Self::scan_directory(path)?
        } else {
            return Err(WorkbookError::NotATable(path.to_path_buf()));
        };

        tracing::debug!(path = %path.display(), sheets = sheets.len(), "Opened CSV workbook.");
        Ok(Self { sheets })
    }

    fn scan_directory(dir: &Path) -> Result<Vec<(String, PathBuf)>, WorkbookError> {
        let io_err = |source| WorkbookError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                files.push(path);
            }
        }
        files.sort();

        Ok(files.into_iter().map(|path| (sheet_name(&path), path)).collect())
    }

    fn read_sheet(path: &Path) -> Result<Vec<Row>, WorkbookError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let row: Row = record
                .iter()
                .enumerate()
                .map(|(column, raw)| {
                    if index == 0 && column == 0 {
                        infer_cell(raw.trim_start_matches('\u{feff}'))
                    } else {
                        infer_cell(raw)
                    }
                })
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}

impl Workbook for CsvWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Row>, WorkbookError> {
        let (_, path) = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .ok_or_else(|| WorkbookError::SheetMissing(sheet.to_string()))?;
        Self::read_sheet(path)
    }
}

/// Types a raw text cell the way a spreadsheet would store it.
///
/// Empty text is an empty cell, finite numbers are numeric, ISO date/times
/// with a time part are native date/times, and everything else stays text.
pub fn infer_cell(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }

    let trimmed = raw.trim();
    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return CellValue::Number(number);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return CellValue::DateTime(dt);
        }
    }

    CellValue::Text(raw.to_string())
}

fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn infer_cell_types_values() {
        assert_eq!(infer_cell(""), CellValue::Empty);
        assert_eq!(infer_cell("-30"), CellValue::Number(-30.0));
        assert_eq!(infer_cell(" 12.5 "), CellValue::Number(12.5));
        assert_eq!(infer_cell("$1,234.56"), CellValue::Text("$1,234.56".into()));
        assert_eq!(infer_cell("-"), CellValue::Text("-".into()));
        assert_eq!(infer_cell("nan"), CellValue::Text("nan".into()));
        assert_eq!(infer_cell("2024-01-05"), CellValue::Text("2024-01-05".into()));

        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(infer_cell("2024-01-05 14:30"), CellValue::DateTime(expected));
        assert_eq!(infer_cell("2024-01-05T14:30:00"), CellValue::DateTime(expected));
    }

    #[test]
    fn single_file_is_one_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("List of trades.csv");
        fs::write(
            &path,
            "\u{feff}Trade #,Date/Time,P&L USD\n1,2024-01-05 10:00,100\n2,2024-01-05,\"$1,234.56\"\n3\n",
        )
        .unwrap();

        let workbook = CsvWorkbook::open(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["List of trades"]);

        let rows = workbook.rows("List of trades").unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], CellValue::Text("Trade #".into()));
        assert_eq!(rows[1][0], CellValue::Number(1.0));
        assert!(matches!(rows[1][1], CellValue::DateTime(_)));
        assert_eq!(rows[2][2], CellValue::Text("$1,234.56".into()));
        assert_eq!(rows[3].len(), 1);
    }

    #[test]
    fn directory_sheets_are_sorted_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_list of trades.csv"), "a\n").unwrap();
        fs::write(dir.path().join("a_summary.CSV"), "a\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let workbook = CsvWorkbook::open(dir.path()).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["a_summary", "b_list of trades"]);
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvWorkbook::open(dir.path().join("absent.csv"));
        assert!(matches!(result, Err(WorkbookError::Io { .. })));
    }
}
