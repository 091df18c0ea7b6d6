use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, DATETIME_FIELD, JournalSettings, LoggingSettings, PNL_FIELD, ProgressSettings,
    REQUIRED_FIELDS, TRADE_NUM_FIELD,
};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `TRADE_CALENDAR__JOURNAL__DATA_DIR`.
pub const ENV_PREFIX: &str = "TRADE_CALENDAR";

/// Loads the application configuration.
///
/// Layers, lowest precedence first: built-in defaults, the TOML file at `path`
/// (or `config.toml` when `None`), then `TRADE_CALENDAR__*` environment
/// variables. An explicitly named file must exist; the default one may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (file, required) = match path {
        Some(path) => (path.to_string_lossy().into_owned(), true),
        None => (DEFAULT_CONFIG_FILE.to_string(), false),
    };

    let builder = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(config::File::new(&file, config::FileFormat::Toml).required(required))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("sheet_names")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(file = %file, sheets = ?config.sheet_names, "Configuration loaded.");
    Ok(config)
}
