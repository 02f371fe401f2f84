//! # Configuration
//!
//! Settings for a pareto run, layered as: built-in defaults, then an optional
//! `pareto.toml`, then `PARETO__SECTION__KEY` environment variables, then
//! command-line `Overrides`. Also home to the small amount of I/O shared by
//! the binary: reading optional definition files and installing tracing.

use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    current_work_week, CompositeSettings, IngestSettings, LoggingSettings, OutputFormat,
    OutputSettings, Overrides, RunSettings, Settings, SourceSettings,
};

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "pareto.toml";

/// Prefix of environment variables overriding the file.
pub const ENV_PREFIX: &str = "PARETO";

/// Loads and validates the run settings.
///
/// An explicitly given file must exist; the default `pareto.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let required = path.is_some();
    let path = path.unwrap_or(Path::new(DEFAULT_SETTINGS_FILE));

    let environment = config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("run.steps")
        .with_list_parse_key("run.configurations")
        .with_list_parse_key("run.packages")
        .with_list_parse_key("sources.grouping_files")
        .with_list_parse_key("ingest.exclude_rows")
        .with_list_parse_key("output.formats");

    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(required))
        .add_source(environment)
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(?settings, "Loaded settings");
    Ok(settings)
}

/// Reads a definition file that may legitimately be absent.
pub fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Optional input not found; continuing without it.");
            Ok(None)
        }
        Err(source) => Err(ConfigError::ReadSource {
            path: path.to_path_buf(),
            source,
        }),
    }
}
