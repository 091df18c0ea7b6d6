use crate::enums::{CellValue, TradeId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One data row of a sheet, cells in column order.
pub type Row = Vec<CellValue>;

/// A normalized, validated trade extracted from a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// The calendar day the trade closed.
    pub date: NaiveDate,
    /// Signed profit or loss in currency units.
    pub pnl: f64,
    /// Source identifier, if the row carried one.
    pub trade_num: Option<TradeId>,
}

impl Trade {
    pub fn new(date: NaiveDate, pnl: f64, trade_num: Option<TradeId>) -> Self {
        Self { date, pnl, trade_num }
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}
