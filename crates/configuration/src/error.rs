use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read, or its values did not fit the schema.
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid sheet_names: {0}")]
    InvalidSheetNames(&'static str),

    #[error("Invalid configuration: excel_columns.{field} must name the header of a required column")]
    MissingColumnMapping { field: String },
}
