//! Store configuration module.
//!
//! This module loads the inventory store configuration from environment
//! variables.
//!
//! # Environment Variables
//!
//! - `INVENTORY_DATA_DIRECTORY`: Directory holding the category files (default: `./data`)
//! - `INVENTORY_ENFORCE_UNIQUE_NAMES`: Reject duplicate item names (default: `true`)
//!
//! # Invariants
//!
//! - `data_directory` is always a valid path (may not exist yet)

use std::path::PathBuf;

/// Environment variable naming the storage root.
pub const DATA_DIRECTORY_VAR: &str = "INVENTORY_DATA_DIRECTORY";
/// Environment variable toggling store-level name uniqueness.
pub const ENFORCE_UNIQUE_NAMES_VAR: &str = "INVENTORY_ENFORCE_UNIQUE_NAMES";

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory where category files are stored.
    /// Each category lives at `{data_directory}/{category}.csv`.
    pub data_directory: PathBuf,
    /// Whether `create` and `update` reject a name already used by another
    /// record (compared case-insensitively).
    pub enforce_unique_names: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from(Self::DEFAULT_DATA_DIRECTORY),
            enforce_unique_names: true,
        }
    }
}

impl StoreConfig {
    /// Default storage root.
    pub const DEFAULT_DATA_DIRECTORY: &'static str = "./data";

    /// Configuration rooted at `data_directory` with default settings.
    pub fn with_data_directory(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `INVENTORY_ENFORCE_UNIQUE_NAMES` is set to
    /// something other than `true`, `false`, `1` or `0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a closure over a map so they
    /// never mutate the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_directory = lookup(DATA_DIRECTORY_VAR)
            .filter(|value| !value.is_empty())
            .map_or_else(
                || PathBuf::from(Self::DEFAULT_DATA_DIRECTORY),
                PathBuf::from,
            );

        let enforce_unique_names = match lookup(ENFORCE_UNIQUE_NAMES_VAR) {
            Some(value) => parse_flag(ENFORCE_UNIQUE_NAMES_VAR, &value)?,
            None => true,
        };

        Ok(Self {
            data_directory,
            enforce_unique_names,
        })
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a boolean (expected true, false, 1 or 0)"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = StoreConfig::from_lookup(lookup(&[])).expect("load config");
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.data_directory, PathBuf::from("./data"));
        assert!(config.enforce_unique_names);
    }

    #[test]
    fn test_reads_variables() {
        let config = StoreConfig::from_lookup(lookup(&[
            (DATA_DIRECTORY_VAR, "/var/lib/inventory"),
            (ENFORCE_UNIQUE_NAMES_VAR, "0"),
        ]))
        .expect("load config");

        assert_eq!(config.data_directory, PathBuf::from("/var/lib/inventory"));
        assert!(!config.enforce_unique_names);
    }

    #[test]
    fn test_empty_directory_falls_back_to_default() {
        let config = StoreConfig::from_lookup(lookup(&[(DATA_DIRECTORY_VAR, "")]))
            .expect("load config");
        assert_eq!(
            config.data_directory,
            PathBuf::from(StoreConfig::DEFAULT_DATA_DIRECTORY)
        );
    }

    #[test]
    fn test_flag_parsing() {
        for (value, expected) in [("true", true), ("TRUE", true), ("1", true), (" false ", false)] {
            let config = StoreConfig::from_lookup(lookup(&[(ENFORCE_UNIQUE_NAMES_VAR, value)]))
                .expect("load config");
            assert_eq!(config.enforce_unique_names, expected, "value {value:?}");
        }
    }

    #[test]
    fn test_invalid_flag() {
        let err = StoreConfig::from_lookup(lookup(&[(ENFORCE_UNIQUE_NAMES_VAR, "maybe")]))
            .expect_err("invalid flag");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref name, .. } if name == ENFORCE_UNIQUE_NAMES_VAR
        ));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(
            error.to_string(),
            "missing required environment variable: TEST_VAR"
        );

        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }
}
