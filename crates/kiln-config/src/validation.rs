//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation,
//! which the resolver always runs.

use regex::Regex;

use crate::error::{ConfigError, Result};
use crate::resolve::BuildConfig;

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()> {
        if config.entries().is_empty() {
            return Err(ConfigError::NoEntries);
        }

        for name in config.entries().keys() {
            if name.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "entry names cannot be empty".to_string(),
                    hint: Some("Give every entry a non-empty key".to_string()),
                });
            }
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ConfigError::SchemaValidation {
                    message: format!("entry name '{name}' must not contain path separators"),
                    hint: Some("Use the output filename pattern to place files".to_string()),
                });
            }
        }

        let pattern = &config.output().filename;
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.filename".to_string(),
                hint: Some("must not be empty".to_string()),
            });
        }
        if config.entries().len() > 1 && !pattern.contains("[name]") {
            return Err(ConfigError::SchemaValidation {
                message: format!(
                    "output filename '{pattern}' would write every entry to the same file"
                ),
                hint: Some("Include the [name] placeholder".to_string()),
            });
        }

        if config.output_dir().as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.dir".to_string(),
                hint: Some("must not be empty".to_string()),
            });
        }

        for rule in config.module_rules() {
            compile_rule_pattern(&rule.test)?;
            if let Some(exclude) = &rule.exclude {
                compile_rule_pattern(exclude)?;
            }
        }

        for plugin in config.plugins() {
            if plugin.name.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "plugin name cannot be empty".to_string(),
                    hint: Some("Set `name` on every [[plugins]] table".to_string()),
                });
            }
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
///
/// Runs the schema checks, then requires every entry file to exist.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &BuildConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        for (name, path) in config.entries() {
            if !path.is_file() {
                return Err(ConfigError::EntryNotFound {
                    name: name.clone(),
                    path: path.clone(),
                });
            }
        }

        Ok(())
    }
}

pub fn validate_schema(config: &BuildConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

pub fn validate_fs(config: &BuildConfig) -> Result<()> {
    FsValidator.validate(config)
}

fn compile_rule_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidRule {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildEnvironment, ConfigResolver, ProjectConfig};
    use serde_json::json;

    fn resolve(value: serde_json::Value) -> Result<BuildConfig> {
        let project = ProjectConfig::from_value(value)?;
        ConfigResolver::new(project, "/project").resolve(BuildEnvironment::Production)
    }

    #[test]
    fn rejects_empty_entries() {
        let err = resolve(json!({ "entries": {} })).unwrap_err();
        assert!(matches!(err, ConfigError::NoEntries));
    }

    #[test]
    fn rejects_entry_name_with_separator() {
        let err = resolve(json!({ "entries": { "a/b": "src/a.ts" } })).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn rejects_shared_filename_for_multiple_entries() {
        let err = resolve(json!({
            "entries": { "a": "src/a.ts", "b": "src/b.ts" },
            "output": { "filename": "bundle.js" }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn single_entry_may_use_fixed_filename() {
        let config = resolve(json!({ "output": { "filename": "bundle.js" } })).unwrap();
        assert_eq!(config.output().filename, "bundle.js");
    }

    #[test]
    fn rejects_broken_rule_regex() {
        let err = resolve(json!({
            "module_rules": [{ "test": "(unclosed", "loaders": [] }]
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn fs_validator_reports_missing_entry() {
        let config = resolve(json!({})).unwrap();
        let err = FsValidator.validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::EntryNotFound { name, .. } if name == "main"));
    }
}
