//! File-based config discovery for CLI use
//!
//! Handles finding and loading `kiln.toml` (or the `kiln` field of
//! `package.json`) and layering `KILN_*` environment variables on top.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::project::ProjectConfig;

pub const CONFIG_FILE_NAME: &str = "kiln.toml";
pub const ENV_PREFIX: &str = "KILN_";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use kiln_config::ConfigDiscovery;
///
/// let project = ConfigDiscovery::new(".").load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. kiln.toml
    /// 2. package.json (kiln field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join(CONFIG_FILE_NAME);
        if toml_path.is_file() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed = serde_json::from_str::<Value>(&content).ok()?;
        match parsed.get("kiln") {
            Some(value) if !value.is_null() => Some(pkg_path),
            _ => None,
        }
    }

    /// Load the discovered config, falling back to defaults when no file exists.
    pub fn load(&self) -> Result<ProjectConfig> {
        match self.find() {
            Some(path) => self.load_from(&path),
            None => {
                debug!(root = %self.root.display(), "no config file found, using defaults");
                extract(Figment::new())
            }
        }
    }

    /// Load config from a specific file path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist.
    pub fn load_from(&self, path: &Path) -> Result<ProjectConfig> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        if !path.is_file() {
            return Err(ConfigError::NotFound(path));
        }

        debug!(path = %path.display(), "loading config file");

        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return self.load_from_package_json(&path);
        }

        let content = fs::read_to_string(&path)?;

        // Parse once up front so syntax errors carry the TOML position
        toml::from_str::<toml::Value>(&content).map_err(|e| ConfigError::InvalidValue {
            field: path.display().to_string(),
            hint: Some(format!("Invalid TOML syntax: {e}")),
        })?;

        extract(Figment::from(Toml::string(&content)))
    }

    fn load_from_package_json(&self, path: &Path) -> Result<ProjectConfig> {
        let content = fs::read_to_string(path)?;

        let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
            field: "package.json".to_string(),
            hint: Some(format!("Invalid JSON: {e}")),
        })?;

        let kiln_value = match parsed.get("kiln") {
            Some(value) if !value.is_null() => value.clone(),
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "kiln".to_string(),
                    hint: Some("Add a 'kiln' object to your package.json".to_string()),
                });
            }
        };

        extract(Figment::from(Serialized::defaults(kiln_value)))
    }
}

/// Layer environment overrides (`KILN_OUTPUT__DIR=build`) and extract.
fn extract(figment: Figment) -> Result<ProjectConfig> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            hint: Some(e.to_string()),
        })
}

/// Discover and load config from the current directory (convenience function)
pub fn discover() -> Result<ProjectConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn find_prefers_kiln_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kiln.toml"), "").unwrap();
        fs::write(dir.path().join("package.json"), r#"{"kiln": {}}"#).unwrap();

        let found = ConfigDiscovery::new(dir.path()).find().unwrap();
        assert_eq!(found, dir.path().join("kiln.toml"));
    }

    #[test]
    fn package_json_without_kiln_field_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    #[serial]
    fn load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigDiscovery::new(dir.path()).load().unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    #[serial]
    fn load_reads_package_json_field() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "app", "kiln": {"base_path": "web", "entries": {"app": "app.ts"}}}"#,
        )
        .unwrap();

        let config = ConfigDiscovery::new(dir.path()).load().unwrap();
        assert_eq!(config.base_path, PathBuf::from("web"));
        assert_eq!(config.entries["app"], PathBuf::from("app.ts"));
    }

    #[test]
    fn load_from_missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = ConfigDiscovery::new(dir.path())
            .load_from(Path::new("custom.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn invalid_toml_reports_syntax_hint() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kiln.toml"), "entries = [").unwrap();

        let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
        match err {
            ConfigError::InvalidValue { hint, .. } => {
                assert!(hint.unwrap().contains("Invalid TOML syntax"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
