//! Error types for configuration loading, resolution and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown build environment '{value}' (expected 'development' or 'production')")]
    UnknownEnvironment { value: String },

    // Filesystem validation errors (for CLI use)
    #[error("entry '{name}' not found: {}", .path.display())]
    EntryNotFound { name: String, path: PathBuf },

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid config value for '{field}'{}", hint_suffix(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("invalid profile override: {message}")]
    InvalidProfileOverride { message: String },

    // Schema validation errors (no filesystem checks)
    #[error("no entries specified")]
    NoEntries,

    #[error("invalid module rule pattern '{pattern}': {message}")]
    InvalidRule { pattern: String, message: String },

    #[error("schema validation failed: {message}{}", hint_suffix(.hint))]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" ({hint})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_environment_names_value() {
        let err = ConfigError::UnknownEnvironment {
            value: "staging".to_string(),
        };
        assert!(err.to_string().contains("'staging'"));
    }

    #[test]
    fn invalid_value_appends_hint() {
        let err = ConfigError::InvalidValue {
            field: "output.dir".to_string(),
            hint: Some("must not be empty".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for 'output.dir' (must not be empty)"
        );
    }
}
