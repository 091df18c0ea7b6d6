use crate::error::AnalyticsError;
use crate::report::{DaySummary, MonthDay, MonthView, Stats};
use chrono::{Datelike, NaiveDate};
use core_types::{DailyPnl, Trade, date_key};
use std::collections::BTreeMap;

/// A stateless calculator for deriving statistics from retained trades.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the headline statistics for a run.
    ///
    /// # Arguments
    ///
    /// * `trades` - Every retained trade, in row order.
    /// * `daily` - The per-day P&L buckets built from those same trades.
    ///
    /// An empty trade list yields all-zero stats.
    pub fn calculate(&self, trades: &[Trade], daily: &DailyPnl) -> Stats {
        if trades.is_empty() {
            return Stats::default();
        }

        let total_trades = trades.len();
        let mut total_pnl = 0.0;
        let mut winning_trades = 0usize;
        for trade in trades {
            total_pnl += trade.pnl;
            if trade.is_win() {
                winning_trades += 1;
            }
        }

        let win_rate = winning_trades as f64 / total_trades as f64 * 100.0;

        let trading_days = daily.active_days();
        let avg_daily = if trading_days > 0 {
            total_pnl / trading_days as f64
        } else {
            0.0
        };

        tracing::debug!(total_trades, trading_days, total_pnl, "Statistics calculated.");

        Stats {
            total_pnl,
            win_rate,
            avg_daily,
            total_trades,
        }
    }

    /// Breaks down a single day. Returns `None` if nothing was traded on `date`.
    pub fn day_summary(&self, date: NaiveDate, trades: &[Trade]) -> Option<DaySummary> {
        let mut day_trades: Vec<Trade> = trades.iter().filter(|t| t.date == date).cloned().collect();
        if day_trades.is_empty() {
            return None;
        }

        let total_pnl = day_trades.iter().map(|t| t.pnl).sum();
        let winning_trades = day_trades.iter().filter(|t| t.is_win()).count();
        let losing_trades = day_trades.iter().filter(|t| t.is_loss()).count();
        let win_rate = winning_trades as f64 / day_trades.len() as f64 * 100.0;

        day_trades.sort_by(|a, b| b.pnl.total_cmp(&a.pnl));

        Some(DaySummary {
            date,
            total_pnl,
            winning_trades,
            losing_trades,
            win_rate,
            trades: day_trades,
        })
    }

    /// Groups trades under their `YYYY-MM-DD` key, preserving row order within a day.
    pub fn group_by_date(&self, trades: &[Trade]) -> BTreeMap<String, Vec<Trade>> {
        let mut grouped: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
        for trade in trades {
            grouped.entry(date_key(trade.date)).or_default().push(trade.clone());
        }
        grouped
    }

    /// Lays out every day of a calendar month with its P&L and trade count.
    pub fn month_view(
        &self,
        daily: &DailyPnl,
        trades: &[Trade],
        year: i32,
        month: u32,
    ) -> Result<MonthView, AnalyticsError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(AnalyticsError::InvalidMonth { year, month })?;

        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for trade in trades {
            if trade.date.year() == year && trade.date.month() == month {
                *counts.entry(trade.date).or_default() += 1;
            }
        }

        let days: Vec<MonthDay> = first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| MonthDay {
                date,
                pnl: daily.get(date).unwrap_or(0.0),
                trade_count: counts.get(&date).copied().unwrap_or(0),
            })
            .collect();
        let total_pnl = days.iter().map(|day| day.pnl).sum();

        Ok(MonthView {
            year,
            month,
            days,
            total_pnl,
        })
    }
}
