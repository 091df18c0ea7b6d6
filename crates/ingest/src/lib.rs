//! # Trade Calendar Ingestion
//!
//! Turns an exported trade list into normalized trades, per-day P&L and
//! summary statistics.
//!
//! A run goes: locate the trades sheet -> resolve header columns -> parse and
//! deduplicate every data row -> bucket by day -> compute statistics. Sheet
//! and header failures abort the run with an [`IngestError`]; bad rows are
//! skipped and only show up in the [`RowTally`].

pub mod aggregator;
pub mod error;
pub mod headers;
pub mod locator;
pub mod parser;
pub mod progress;

pub use aggregator::{IngestResult, RowTally, TradeAggregator};
pub use error::{IngestError, MissingColumn};
pub use headers::{HeaderMap, resolve_headers};
pub use locator::find_trades_sheet;
pub use parser::{MIN_TRADE_YEAR, Rejection, RowParser, parse_date, parse_pnl};
pub use progress::{NoProgress, ProgressSchedule, ProgressSink, TracingProgress};

use chrono::NaiveDate;
use configuration::Config;
use std::fs;
use std::path::Path;
use workbook::Workbook;

/// Runs ingestion against a fixed configuration.
///
/// Cheap to construct; holds no state between runs.
#[derive(Debug, Clone, Copy)]
pub struct Ingestor<'a> {
    config: &'a Config,
    today: Option<NaiveDate>,
}

impl<'a> Ingestor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            today: None,
        }
    }

    /// Pins the date used for the future-trade check instead of the system date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Ingests the trades sheet of an already opened workbook.
    pub fn process_workbook<W: Workbook + ?Sized>(
        &self,
        workbook: &W,
        sink: &dyn ProgressSink,
    ) -> Result<IngestResult, IngestError> {
        sink.report("Scanning for trading data sheets...");
        let sheet = find_trades_sheet(workbook, self.config, sink)?;

        let mut rows = workbook.rows(&sheet)?;

        sink.report("Analyzing column headers...");
        let header_row = if rows.is_empty() {
            Vec::new()
        } else {
            rows.remove(0)
        };
        let headers = resolve_headers(&header_row, self.config, sink)?;

        sink.report("Reading trade data into memory...");
        let mut aggregator = TradeAggregator::new(&headers);
        if let Some(today) = self.today {
            aggregator = aggregator.with_today(today);
        }
        let result = aggregator.run(&rows, sink);

        tracing::info!(
            sheet = %sheet,
            trades = result.stats.total_trades,
            total_pnl = result.stats.total_pnl,
            "Ingestion complete."
        );
        Ok(result)
    }

    /// Opens an Excel workbook, a `.csv` file or a directory of `.csv` files
    /// and ingests it. The reader is chosen by file extension.
    ///
    /// Files smaller than `progress.small_file_bytes` are processed without
    /// progress messages.
    pub fn process_file(
        &self,
        path: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<IngestResult, IngestError> {
        let is_small = fs::metadata(path)
            .map(|meta| meta.is_file() && meta.len() < self.config.progress.small_file_bytes)
            .unwrap_or(false);
        let sink: &dyn ProgressSink = if is_small { &NoProgress } else { sink };

        sink.report("Opening trade file...");
        let source = workbook::open_path(path)?;
        self.process_workbook(source.as_ref(), sink)
    }
}

/// Ingests a workbook using the system date. See [`Ingestor::process_workbook`].
pub fn process_workbook<W: Workbook + ?Sized>(
    workbook: &W,
    config: &Config,
    sink: &dyn ProgressSink,
) -> Result<IngestResult, IngestError> {
    Ingestor::new(config).process_workbook(workbook, sink)
}

/// Ingests a file using the system date. See [`Ingestor::process_file`].
pub fn process_file(
    path: &Path,
    config: &Config,
    sink: &dyn ProgressSink,
) -> Result<IngestResult, IngestError> {
    Ingestor::new(config).process_file(path, sink)
}
