use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single typed cell read from a tabular source.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// True for a missing cell or a cell holding an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Spreadsheet truthiness: empty cells, empty text and numeric zero are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::DateTime(_) => true,
        }
    }

    /// Renders the cell the way it would read as plain text.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// The identifier a source assigns to a trade, used only for deduplication.
///
/// Numbers compare by value, with `-0.0` and `0.0` treated as the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TradeId {
    Number(f64),
    Text(String),
}

impl TradeId {
    /// Extracts an identifier from a cell.
    ///
    /// Falsy cells (empty, empty text, numeric zero) carry no identifier, so
    /// such rows are never deduplicated.
    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        if !cell.is_truthy() {
            return None;
        }
        match cell {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(TradeId::Text(s.clone())),
            CellValue::Number(n) => Some(TradeId::Number(*n)),
            CellValue::DateTime(_) => Some(TradeId::Text(cell.to_text())),
        }
    }

    fn number_bits(n: f64) -> u64 {
        if n == 0.0 { 0.0f64.to_bits() } else { n.to_bits() }
    }
}

impl PartialEq for TradeId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TradeId::Number(a), TradeId::Number(b)) => {
                TradeId::number_bits(*a) == TradeId::number_bits(*b)
            }
            (TradeId::Text(a), TradeId::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TradeId {}

impl Hash for TradeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TradeId::Number(n) => {
                0u8.hash(state);
                TradeId::number_bits(*n).hash(state);
            }
            TradeId::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeId::Number(n) => f.write_str(&format_number(*n)),
            TradeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TradeId {
    fn from(value: &str) -> Self {
        TradeId::Text(value.to_string())
    }
}

impl From<i64> for TradeId {
    fn from(value: i64) -> Self {
        TradeId::Number(value as f64)
    }
}

/// Integral values print without a fractional part ("12", not "12.0").
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    #[test]
    fn truthiness_follows_spreadsheet_rules() {
        assert!(!CellValue::Empty.is_truthy());
        assert!(!CellValue::Text(String::new()).is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert!(CellValue::Text(" ".into()).is_truthy());
        assert!(CellValue::Number(-1.0).is_truthy());
    }

    #[test]
    fn to_text_drops_integral_fraction() {
        assert_eq!(CellValue::Number(42.0).to_text(), "42");
        assert_eq!(CellValue::Number(1.25).to_text(), "1.25");
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_text(), "2024-01-05 09:30:00");
    }

    #[test]
    fn trade_id_from_cell_skips_empty_values() {
        assert_eq!(TradeId::from_cell(&CellValue::Empty), None);
        assert_eq!(TradeId::from_cell(&CellValue::Text(String::new())), None);
        assert_eq!(TradeId::from_cell(&CellValue::Number(0.0)), None);
        assert_eq!(TradeId::from_cell(&CellValue::Number(-0.0)), None);
        assert_eq!(
            TradeId::from_cell(&CellValue::Text("T1".into())),
            Some(TradeId::from("T1"))
        );
        assert_eq!(
            TradeId::from_cell(&CellValue::Number(7.0)),
            Some(TradeId::from(7i64))
        );
    }

    #[test]
    fn numeric_and_text_ids_are_distinct() {
        let mut seen = HashSet::new();
        seen.insert(TradeId::from(1i64));
        assert!(seen.contains(&TradeId::Number(1.0)));
        assert!(!seen.contains(&TradeId::from("1")));
        seen.insert(TradeId::Number(-0.0));
        assert!(seen.contains(&TradeId::Number(0.0)));
    }

    #[test]
    fn trade_id_serializes_untagged() {
        let json = serde_json::to_string(&vec![TradeId::from("A-1"), TradeId::from(3i64)]).unwrap();
        assert_eq!(json, r#"["A-1",3.0]"#);
        let back: Vec<TradeId> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![TradeId::from("A-1"), TradeId::from(3i64)]);
    }
}
