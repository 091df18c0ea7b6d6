use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("I/O error while reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed Excel workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("Sheet '{0}' does not exist in this workbook")]
    SheetMissing(String),

    #[error("'{0}' is neither a spreadsheet, a .csv file nor a directory of .csv files")]
    NotATable(PathBuf),
}
