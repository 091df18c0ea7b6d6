use crate::headers::HeaderMap;
use crate::parser::{Rejection, RowParser};
use crate::progress::{ProgressSchedule, ProgressSink};
use analytics::{AnalyticsEngine, Stats};
use chrono::{Local, NaiveDate};
use core_types::{DailyPnl, Row, Trade, TradeId};
use std::collections::HashSet;

/// Everything one ingestion run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestResult {
    /// Retained trades, in original row order.
    pub trades: Vec<Trade>,
    /// Summed P&L per `YYYY-MM-DD`.
    pub daily_pnl: DailyPnl,
    pub stats: Stats,
    /// How each data row was handled. Diagnostics only.
    pub tally: RowTally,
}

/// Per-run counts of accepted rows and of each rejection reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTally {
    pub rows_read: usize,
    pub accepted: usize,
    pub missing_date: usize,
    pub missing_pnl: usize,
    pub duplicate_trade_id: usize,
    pub unparseable_date: usize,
    pub future_date: usize,
    pub before_minimum_year: usize,
    pub unparseable_pnl: usize,
}

impl RowTally {
    fn record(&mut self, rejection: Rejection) {
        let counter = match rejection {
            Rejection::MissingDate => &mut self.missing_date,
            Rejection::MissingPnl => &mut self.missing_pnl,
            Rejection::DuplicateTradeId => &mut self.duplicate_trade_id,
            Rejection::UnparseableDate => &mut self.unparseable_date,
            Rejection::FutureDate => &mut self.future_date,
            Rejection::BeforeMinimumYear => &mut self.before_minimum_year,
            Rejection::UnparseablePnl => &mut self.unparseable_pnl,
        };
        *counter += 1;
    }

    /// Rows that produced no trade.
    pub fn rejected(&self) -> usize {
        self.rows_read - self.accepted
    }
}

/// Drives the row parser over a sheet's data rows and aggregates the result.
///
/// All accumulator state (seen identifiers, day buckets) lives inside a single
/// `run` call, so one aggregator can be reused and every run starts fresh.
#[derive(Debug)]
pub struct TradeAggregator<'a> {
    headers: &'a HeaderMap,
    today: NaiveDate,
    analytics_engine: AnalyticsEngine,
}

impl<'a> TradeAggregator<'a> {
    /// Creates an aggregator that rejects trades dated after the local system date.
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self {
            headers,
            today: Local::now().date_naive(),
            analytics_engine: AnalyticsEngine::new(),
        }
    }

    /// Overrides the date treated as "today" for the future-trade check.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Processes every data row (header row excluded) in order.
    pub fn run(&self, rows: &[Row], sink: &dyn ProgressSink) -> IngestResult {
        let total_rows = rows.len();
        let mut tally = RowTally {
            rows_read: total_rows,
            ..RowTally::default()
        };

        if total_rows == 0 {
            sink.report("No data rows found");
            return IngestResult {
                trades: Vec::new(),
                daily_pnl: DailyPnl::new(),
                stats: Stats::default(),
                tally,
            };
        }

        let parser = RowParser::new(self.headers, self.today);
        let schedule = ProgressSchedule::for_rows(total_rows);
        let mut trades = Vec::with_capacity(total_rows);
        let mut daily_pnl = DailyPnl::new();
        let mut seen: HashSet<TradeId> = HashSet::new();

        if schedule.enabled {
            sink.report("Processing trade data...");
        }

        for (index, row) in rows.iter().enumerate() {
            if schedule.is_due(index) {
                sink.report(&format!(
                    "Processing trades... {}% ({}/{})",
                    schedule.percent(index),
                    index,
                    total_rows
                ));
            }

            match parser.parse(row, &seen) {
                Ok(trade) => {
                    // Only a retained row claims its identifier.
                    if let Some(id) = &trade.trade_num {
                        seen.insert(id.clone());
                    }
                    daily_pnl.add(trade.date, trade.pnl);
                    trades.push(trade);
                    tally.accepted += 1;
                }
                Err(rejection) => {
                    tracing::trace!(row = index + 2, %rejection, "Row skipped.");
                    tally.record(rejection);
                }
            }
        }

        let stats = self.analytics_engine.calculate(&trades, &daily_pnl);

        sink.report(&format!("Successfully processed {} unique trades", trades.len()));
        tracing::info!(
            rows = total_rows,
            accepted = tally.accepted,
            rejected = tally.rejected(),
            days = daily_pnl.len(),
            "Trade rows aggregated."
        );

        IngestResult {
            trades,
            daily_pnl,
            stats,
            tally,
        }
    }
}
