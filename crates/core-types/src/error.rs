use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid date key '{0}': expected YYYY-MM-DD")]
    InvalidDateKey(String),
}
