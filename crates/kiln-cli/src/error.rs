//! Error handling for the kiln CLI.
//!
//! `CliError` wraps the library errors and decides the process exit code:
//! configuration problems exit with 2, build and check failures with 1.

use std::path::PathBuf;

use kiln_bundler::PluginConfigError;
use miette::Report;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] kiln_config::ConfigError),

    #[error("Plugin configuration error: {0}")]
    PluginConfig(#[from] PluginConfigError),

    #[error(transparent)]
    Build(#[from] kiln_bundler::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_)
            | CliError::PluginConfig(_)
            | CliError::InvalidArgument(_)
            | CliError::FileNotFound(_) => 2,
            CliError::Build(kiln_bundler::Error::Config(_))
            | CliError::Build(kiln_bundler::Error::PluginConfig(_)) => 2,
            CliError::Build(_) | CliError::Watch(_) | CliError::Io(_) => 1,
        }
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into `CliError::FileNotFound(path)`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }
}

/// Convert a `CliError` into a miette report for the final message.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => Report::new(e),
        CliError::Config(e) => match hint_for(&e) {
            Some(hint) => miette::miette!(help = hint, "Configuration error: {}", e),
            None => miette::miette!("Configuration error: {}", e),
        },
        other => miette::miette!("{}", other),
    }
}

fn hint_for(err: &kiln_config::ConfigError) -> Option<&'static str> {
    match err {
        kiln_config::ConfigError::UnknownEnvironment { .. } => {
            Some("use `development` (or `dev`) or `production` (or `prod`)")
        }
        kiln_config::ConfigError::EntryNotFound { .. } => {
            Some("entries are resolved against <root>/<base_path>")
        }
        _ => None,
    }
}
