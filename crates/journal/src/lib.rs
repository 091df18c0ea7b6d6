//! # Trade Calendar Journal
//!
//! The on-disk archive of past ingestion runs. Every saved run becomes one
//! pretty-printed JSON snapshot in the journal directory, named after the
//! source file and the moment it was saved.
//!
//! ## Public API
//!
//! - `Journal`: opens a directory and saves, loads, lists and clears snapshots.
//! - `Snapshot`: the persisted form of one run.
//! - `JournalEntry`: a directory listing row returned by `Journal::history`.
//! - `JournalError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod store;

pub use error::JournalError;
pub use store::{Journal, JournalEntry, Snapshot, TIMESTAMP_FORMAT};
