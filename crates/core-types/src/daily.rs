use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Format of the keys in a [`DailyPnl`] map.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Formats a date as a `YYYY-MM-DD` bucket key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Summed P&L per calendar day, keyed by `YYYY-MM-DD`.
///
/// Only days that received at least one trade are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyPnl(BTreeMap<String, f64>);

impl DailyPnl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `pnl` to the bucket for `date`, creating it if needed.
    pub fn add(&mut self, date: NaiveDate, pnl: f64) {
        *self.0.entry(date_key(date)).or_insert(0.0) += pnl;
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.0.get(&date_key(date)).copied()
    }

    /// Looks a day up by its textual key, validating the key first.
    pub fn get_key(&self, key: &str) -> Result<Option<f64>, CoreError> {
        let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
            .map_err(|_| CoreError::InvalidDateKey(key.to_string()))?;
        Ok(self.get(date))
    }

    /// Sum of every bucket.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Number of days whose aggregated value is non-zero.
    pub fn active_days(&self) -> usize {
        self.0.values().filter(|pnl| **pnl != 0.0).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, f64> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Buckets falling inside the given month, as `(date, pnl)` pairs.
    pub fn in_month(&self, year: i32, month: u32) -> Vec<(NaiveDate, f64)> {
        self.0
            .iter()
            .filter_map(|(key, pnl)| {
                let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()?;
                (date.year() == year && date.month() == month).then_some((date, *pnl))
            })
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.0
    }
}

impl From<BTreeMap<String, f64>> for DailyPnl {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a DailyPnl {
    type Item = (&'a String, &'a f64);
    type IntoIter = btree_map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_sums_into_day_buckets() {
        let mut daily = DailyPnl::new();
        daily.add(day(2024, 1, 5), 100.0);
        daily.add(day(2024, 1, 5), -30.0);
        daily.add(day(2024, 1, 6), 50.0);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily.get(day(2024, 1, 5)), Some(70.0));
        assert_eq!(daily.get_key("2024-01-06"), Ok(Some(50.0)));
        assert_eq!(daily.get_key("2024-01-07"), Ok(None));
        assert_eq!(daily.total(), 120.0);
    }

    #[test]
    fn active_days_ignores_flat_days() {
        let mut daily = DailyPnl::new();
        daily.add(day(2024, 2, 1), 25.0);
        daily.add(day(2024, 2, 1), -25.0);
        daily.add(day(2024, 2, 2), 10.0);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily.active_days(), 1);
    }

    #[test]
    fn get_key_rejects_malformed_keys() {
        let daily = DailyPnl::new();
        assert_eq!(
            daily.get_key("05/01/2024"),
            Err(CoreError::InvalidDateKey("05/01/2024".into()))
        );
    }

    #[test]
    fn in_month_filters_by_calendar_month() {
        let mut daily = DailyPnl::new();
        daily.add(day(2023, 12, 31), 1.0);
        daily.add(day(2024, 1, 2), 2.0);
        daily.add(day(2024, 1, 31), 3.0);
        daily.add(day(2024, 2, 1), 4.0);
        assert_eq!(
            daily.in_month(2024, 1),
            vec![(day(2024, 1, 2), 2.0), (day(2024, 1, 31), 3.0)]
        );
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut daily = DailyPnl::new();
        daily.add(day(2024, 1, 5), 70.0);
        assert_eq!(serde_json::to_string(&daily).unwrap(), r#"{"2024-01-05":70.0}"#);
    }
}
