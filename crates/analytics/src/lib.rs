//! # Trade Calendar Analytics
//!
//! Summary statistics and calendar views derived from an ingestion result.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` holds no state. Every figure is
//!   recomputed from the trades and daily buckets it is handed, never updated in place.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `Stats`: Headline figures for a run (total P&L, win rate, average day, trade count).
//! - `DaySummary` / `MonthView`: Per-day and per-month breakdowns.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{DaySummary, MonthDay, MonthView, Stats};
