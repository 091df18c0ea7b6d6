//! # Trade Calendar Core Types
//!
//! Layer 0 of the workspace: the value types every other crate speaks in.
//! Nothing here performs I/O.

pub mod daily;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use daily::{DATE_KEY_FORMAT, DailyPnl, date_key};
pub use enums::{CellValue, TradeId};
pub use error::CoreError;
pub use structs::{Row, Trade};
