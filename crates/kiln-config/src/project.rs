//! Project configuration as written in `kiln.toml`.
//!
//! This module provides the `ProjectConfig` struct and profile merging logic.
//! For file discovery, see the `discovery` module; for turning a project
//! config into a `BuildConfig`, see the `resolve` module.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result as ConfigResult};
use crate::helpers::{default_base_path, default_entries, default_module_rules};
use crate::types::{EngineSpec, ModuleRule, OutputOptions, PluginSpec, SourceMapMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory entries and output are resolved against, relative to the root
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Entry name -> source file
    #[serde(default = "default_entries")]
    pub entries: IndexMap<String, PathBuf>,

    #[serde(default)]
    pub output: OutputOptions,

    /// Source map flavour for development builds. Production never emits maps.
    #[serde(default)]
    pub source_map: SourceMapMode,

    #[serde(default = "default_module_rules")]
    pub module_rules: Vec<ModuleRule>,

    /// Ordered plugin list; `None` selects the built-in defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginSpec>>,

    #[serde(default)]
    pub engine: EngineSpec,

    #[serde(default)]
    pub watch: WatchOptions,

    /// Per-environment overrides, deep-merged over the base
    #[serde(default, skip_serializing)]
    pub profiles: HashMap<String, Value>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            entries: default_entries(),
            output: OutputOptions::default(),
            source_map: SourceMapMode::default(),
            module_rules: default_module_rules(),
            plugins: None,
            engine: EngineSpec::default(),
            watch: WatchOptions::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Rebuild trigger tuning for development builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Debounce window for repeated events on the same file
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Directory names or `*.ext` patterns that never trigger a rebuild
    #[serde(default = "default_watch_ignore")]
    pub ignore: Vec<String>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore: default_watch_ignore(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_watch_ignore() -> Vec<String> {
    vec!["node_modules".to_string(), "*.tsbuildinfo".to_string()]
}

impl ProjectConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use kiln_config::ProjectConfig;
    /// use serde_json::json;
    /// use std::path::PathBuf;
    ///
    /// let config = ProjectConfig::from_value(json!({
    ///     "entries": { "app": "src/app.tsx" }
    /// }))
    /// .unwrap();
    /// assert_eq!(config.entries["app"], PathBuf::from("src/app.tsx"));
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Apply the named profile, if present, over the base configuration.
    pub fn materialize_profile(mut self, profile: &str) -> ConfigResult<Self> {
        let Some(overrides) = self.profiles.get(profile).cloned() else {
            return Ok(self);
        };

        if overrides.is_null() {
            return Ok(self);
        }

        if !overrides.is_object() {
            return Err(ConfigError::InvalidProfileOverride {
                message: format!("profile '{profile}' must be a table"),
            });
        }

        let profiles = std::mem::take(&mut self.profiles);
        let mut base =
            serde_json::to_value(&self).map_err(|err| ConfigError::InvalidProfileOverride {
                message: err.to_string(),
            })?;
        merge_values(&mut base, &overrides);

        let mut merged: ProjectConfig =
            serde_json::from_value(base).map_err(|err| ConfigError::InvalidProfileOverride {
                message: format!("profile '{profile}': {err}"),
            })?;
        merged.profiles = profiles;
        Ok(merged)
    }
}

/// Deep merge: objects merge key by key, everything else is replaced.
fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_single_entry_layout() {
        let config = ProjectConfig::default();
        assert_eq!(config.base_path, PathBuf::from("static/js"));
        assert_eq!(config.entries.len(), 1);
        assert_eq!(config.entries["main"], PathBuf::from("src/index.tsx"));
        assert_eq!(config.output.filename, "[name].js");
        assert!(config.plugins.is_none());
    }

    #[test]
    fn explicit_entries_replace_default_entry() {
        let config = ProjectConfig::from_value(json!({
            "entries": { "admin": "src/admin.tsx" }
        }))
        .unwrap();
        assert_eq!(config.entries.len(), 1);
        assert!(config.entries.contains_key("admin"));
    }

    #[test]
    fn profile_merging_is_deep() {
        let config = ProjectConfig::from_value(json!({
            "output": { "dir": "build", "filename": "[name].js" },
            "profiles": {
                "production": {
                    "output": { "filename": "[name].[contenthash].js" }
                }
            }
        }))
        .unwrap()
        .materialize_profile("production")
        .unwrap();

        assert_eq!(config.output.dir, PathBuf::from("build"));
        assert_eq!(config.output.filename, "[name].[contenthash].js");
        assert!(config.profiles.contains_key("production"));
    }

    #[test]
    fn profile_arrays_replace_base_arrays() {
        let config = ProjectConfig::from_value(json!({
            "watch": { "ignore": ["node_modules", "coverage"] },
            "profiles": { "development": { "watch": { "ignore": ["tmp"] } } }
        }))
        .unwrap()
        .materialize_profile("development")
        .unwrap();

        assert_eq!(config.watch.ignore, vec!["tmp".to_string()]);
    }

    #[test]
    fn missing_profile_is_a_no_op() {
        let base = ProjectConfig::default();
        let merged = base.clone().materialize_profile("production").unwrap();
        assert_eq!(base, merged);
    }

    #[test]
    fn scalar_profile_is_rejected() {
        let config = ProjectConfig::from_value(json!({
            "profiles": { "production": 3 }
        }))
        .unwrap();
        let err = config.materialize_profile("production").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProfileOverride { .. }));
    }
}
