use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::environment::BuildEnvironment;
use crate::types::{ModuleRule, PluginSpec};

// Helper defaults
pub(crate) fn default_base_path() -> PathBuf {
    PathBuf::from("static/js")
}

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub(crate) fn default_filename() -> String {
    "[name].js".to_string()
}

pub(crate) fn empty_options() -> Value {
    Value::Object(serde_json::Map::new())
}

pub(crate) fn default_entries() -> IndexMap<String, PathBuf> {
    let mut entries = IndexMap::new();
    entries.insert("main".to_string(), PathBuf::from("src/index.tsx"));
    entries
}

pub(crate) fn default_module_rules() -> Vec<ModuleRule> {
    vec![ModuleRule {
        test: r"\.(js|jsx|ts|tsx)$".to_string(),
        exclude: Some("node_modules".to_string()),
        loaders: vec!["babel-loader".to_string()],
    }]
}

/// Plugins used when the project file declares none: clean, manifest, then
/// type/lint checking with autofix outside production.
pub fn default_plugins(env: BuildEnvironment) -> Vec<PluginSpec> {
    vec![
        PluginSpec::new("clean", empty_options()),
        PluginSpec::new("manifest", empty_options()),
        PluginSpec::new(
            "type-check",
            json!({
                "typescript": {
                    "diagnostic_options": {
                        "semantic": true,
                        "syntactic": true
                    },
                    "mode": "write-references"
                },
                "eslint": {
                    "files": "**/js/src/**/*.{ts,tsx,js,jsx}",
                    "fix": !env.is_production()
                }
            }),
        ),
    ]
}
