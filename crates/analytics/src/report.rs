use chrono::NaiveDate;
use core_types::Trade;
use serde::{Deserialize, Serialize};

/// Headline figures for one ingestion run.
///
/// Produced wholesale by `AnalyticsEngine::calculate`; a new run supersedes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Sum of P&L over all retained trades.
    pub total_pnl: f64,
    /// Percentage (0-100) of trades with strictly positive P&L.
    pub win_rate: f64,
    /// Total P&L divided by the number of days with a non-zero result.
    pub avg_daily: f64,
    pub total_trades: usize,
}

/// Everything traded on a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_pnl: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    /// The day's trades, best result first.
    pub trades: Vec<Trade>,
}

/// One day cell of a month view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthDay {
    pub date: NaiveDate,
    /// The day's aggregated P&L, 0.0 when nothing was traded.
    pub pnl: f64,
    pub trade_count: usize,
}

/// Per-day P&L for every day of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<MonthDay>,
    pub total_pnl: f64,
}

impl MonthView {
    /// The `(year, month)` before this one.
    pub fn previous(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    /// The `(year, month)` after this one.
    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }

    /// Days in the month with at least one trade.
    pub fn trading_days(&self) -> impl Iterator<Item = &MonthDay> {
        self.days.iter().filter(|day| day.trade_count > 0)
    }
}
