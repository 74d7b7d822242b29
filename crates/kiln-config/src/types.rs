//! Building blocks shared by the project file and the resolved build config.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::helpers::{default_filename, default_output_dir, empty_options};

/// Source map generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// No source maps
    Disabled,
    /// Base64 data URL appended to each bundle
    #[default]
    Inline,
    /// Sibling `.map` file per bundle
    External,
}

impl SourceMapMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SourceMapMode::Disabled)
    }
}

/// Where and how bundles are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Output directory (relative to the base path until resolved)
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Filename pattern; supports `[name]`, `[hash]` and `[contenthash]`
    #[serde(default = "default_filename")]
    pub filename: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: default_filename(),
        }
    }
}

/// Selects which source files are handed to which loaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRule {
    /// Regex matched against the module path
    pub test: String,

    /// Regex of paths skipped even when `test` matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// Loader names applied in order
    #[serde(default)]
    pub loaders: Vec<String>,
}

/// A plugin reference plus its raw option table.
///
/// Options stay untyped here; the plugin pipeline decodes and rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,

    #[serde(default = "empty_options")]
    pub options: Value,
}

impl PluginSpec {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// Bundling engine selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EngineSpec {
    /// Built-in per-entry emitter
    #[default]
    Native,
    /// External bundler executable (e.g. esbuild)
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}
