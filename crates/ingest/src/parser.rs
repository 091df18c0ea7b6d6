use crate::headers::HeaderMap;
use chrono::{Datelike, NaiveDate};
use core_types::{CellValue, Trade, TradeId};
use std::collections::HashSet;
use std::fmt;

/// Trades dated before this year are treated as bad data.
pub const MIN_TRADE_YEAR: i32 = 2000;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Why a row produced no trade. Rejected rows are skipped, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The date cell is empty, blank or zero.
    MissingDate,
    /// The P&L cell is empty.
    MissingPnl,
    /// The identifier was already retained earlier in this run.
    DuplicateTradeId,
    /// The date is neither a native date/time nor text starting with `YYYY-MM-DD`.
    UnparseableDate,
    /// The date lies after today.
    FutureDate,
    /// The date lies before the year 2000.
    BeforeMinimumYear,
    /// The P&L is not a number or numeric text.
    UnparseablePnl,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::MissingDate => "missing date",
            Rejection::MissingPnl => "missing P&L",
            Rejection::DuplicateTradeId => "duplicate trade number",
            Rejection::UnparseableDate => "unparseable date",
            Rejection::FutureDate => "date in the future",
            Rejection::BeforeMinimumYear => "date before 2000",
            Rejection::UnparseablePnl => "unparseable P&L",
        };
        f.write_str(reason)
    }
}

/// Turns raw rows into trades using resolved column positions.
///
/// Stateless: the caller owns the set of identifiers already retained and
/// decides when to extend it.
#[derive(Debug, Clone, Copy)]
pub struct RowParser<'a> {
    headers: &'a HeaderMap,
    today: NaiveDate,
}

impl<'a> RowParser<'a> {
    /// `today` is the last date a trade may carry.
    pub fn new(headers: &'a HeaderMap, today: NaiveDate) -> Self {
        Self { headers, today }
    }

    /// Validates one row. Checks run in a fixed order and the first failure decides:
    /// presence of date and P&L, duplicate identifier, date, then P&L.
    pub fn parse(&self, row: &[CellValue], seen: &HashSet<TradeId>) -> Result<Trade, Rejection> {
        let cell = |index: usize| row.get(index).unwrap_or(&EMPTY_CELL);

        let datetime_cell = cell(self.headers.datetime());
        let pnl_cell = cell(self.headers.pnl());
        let trade_num = self
            .headers
            .trade_num()
            .and_then(|index| TradeId::from_cell(cell(index)));

        if !datetime_cell.is_truthy() {
            return Err(Rejection::MissingDate);
        }
        if matches!(pnl_cell, CellValue::Empty) {
            return Err(Rejection::MissingPnl);
        }

        if let Some(id) = &trade_num {
            if seen.contains(id) {
                return Err(Rejection::DuplicateTradeId);
            }
        }

        let date = parse_date(datetime_cell, self.today)?;
        let pnl = parse_pnl(pnl_cell)?;

        Ok(Trade::new(date, pnl, trade_num))
    }
}

/// Extracts the trade's calendar day and checks it is plausible.
///
/// Native date/times contribute their date part. Anything else is read as
/// text, and its first whitespace-separated token must be exactly a
/// `YYYY-MM-DD` date. Dates after `today` or before 2000 are rejected.
pub fn parse_date(cell: &CellValue, today: NaiveDate) -> Result<NaiveDate, Rejection> {
    let date = match cell {
        CellValue::DateTime(dt) => dt.date(),
        other => {
            let text = other.to_text();
            let token = text.split_whitespace().next().ok_or(Rejection::UnparseableDate)?;
            NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| Rejection::UnparseableDate)?
        }
    };

    if date > today {
        return Err(Rejection::FutureDate);
    }
    if date.year() < MIN_TRADE_YEAR {
        return Err(Rejection::BeforeMinimumYear);
    }
    Ok(date)
}

/// Reads a signed P&L amount.
///
/// Numbers are taken as-is. Text has commas and dollar signs removed and is
/// trimmed; an empty result or a lone `-` is rejected.
pub fn parse_pnl(cell: &CellValue) -> Result<f64, Rejection> {
    match cell {
        CellValue::Number(n) => Ok(*n),
        CellValue::Text(raw) => {
            let cleaned = raw.replace([',', '$'], "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() || cleaned == "-" {
                return Err(Rejection::UnparseablePnl);
            }
            cleaned.parse::<f64>().map_err(|_| Rejection::UnparseablePnl)
        }
        CellValue::Empty | CellValue::DateTime(_) => Err(Rejection::UnparseablePnl),
    }
}
