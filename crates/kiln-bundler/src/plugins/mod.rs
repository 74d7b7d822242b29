//! Plugin pipeline: ordered build-lifecycle hooks around the bundling step.
//!
//! A [`PluginPipeline`] turns the `PluginSpec` list of a `BuildConfig` into a
//! [`PluginSet`] by looking each name up in a [`PluginRegistry`]. Engines then
//! drive the set through three hooks, always in declaration order:
//!
//! 1. `before_run` - before any entry is read (clean the output directory)
//! 2. `process_assets` - after compilation, before writing (emit a manifest)
//! 3. `after_emit` - after the bundle is on disk (type and lint checks)

mod clean;
mod manifest;
mod registry;
mod type_check;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_config::{BuildConfig, PluginSpec};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::asset::OutputBundle;
use crate::diagnostics::Diagnostic;

pub use clean::{CleanOptions, CleanPlugin};
pub use manifest::{ManifestOptions, ManifestPlugin};
pub use registry::{PluginFactory, PluginRegistry};
pub use type_check::{
    DiagnosticOptions, EslintOptions, TypeCheckOptions, TypeCheckPlugin, TypeScriptMode,
    TypeScriptOptions,
};

/// Rejected plugin configuration, always naming the plugin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginConfigError {
    #[error("unknown plugin '{plugin}'")]
    UnknownPlugin { plugin: String },

    #[error("invalid options for plugin '{plugin}': {reason}")]
    InvalidOptions { plugin: String, reason: String },
}

impl PluginConfigError {
    pub fn plugin(&self) -> &str {
        match self {
            PluginConfigError::UnknownPlugin { plugin }
            | PluginConfigError::InvalidOptions { plugin, .. } => plugin,
        }
    }
}

/// Failure raised from inside a hook.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("{0}")]
    Failed(String),

    #[error("type checker reported errors")]
    TypeCheck(Vec<Diagnostic>),

    #[error("linter reported errors")]
    Lint(Vec<Diagnostic>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    fn into_error(self, plugin: &str) -> crate::Error {
        match self {
            PluginError::TypeCheck(diagnostics) => crate::Error::TypeCheck(diagnostics),
            PluginError::Lint(diagnostics) => crate::Error::Lint(diagnostics),
            other => crate::Error::Plugin {
                plugin: plugin.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// State shared with hooks during one build.
pub struct HookContext<'a> {
    config: &'a BuildConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> HookContext<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self {
            config,
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        self.config
    }

    /// Record a non-fatal diagnostic; it ends up in the build report.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Paths the watcher must not react to (files this plugin writes).
    fn watch_ignores(&self, _config: &BuildConfig) -> Vec<PathBuf> {
        Vec::new()
    }

    async fn before_run(&self, _ctx: &mut HookContext<'_>) -> Result<(), PluginError> {
        Ok(())
    }

    async fn process_assets(
        &self,
        _ctx: &mut HookContext<'_>,
        _bundle: &mut OutputBundle,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    async fn after_emit(
        &self,
        _ctx: &mut HookContext<'_>,
        _bundle: &OutputBundle,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

pub type PluginHandle = Arc<dyn Plugin>;

/// Assembled plugins in hook execution order.
#[derive(Clone, Default)]
pub struct PluginSet {
    plugins: Vec<PluginHandle>,
}

impl PluginSet {
    pub fn new(plugins: Vec<PluginHandle>) -> Self {
        Self { plugins }
    }

    pub fn handles(&self) -> &[PluginHandle] {
        &self.plugins
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn watch_ignores(&self, config: &BuildConfig) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .plugins
            .iter()
            .flat_map(|p| p.watch_ignores(config))
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    pub async fn before_run(&self, ctx: &mut HookContext<'_>) -> crate::Result<()> {
        for plugin in &self.plugins {
            debug!(plugin = plugin.name(), "before_run");
            plugin
                .before_run(ctx)
                .await
                .map_err(|e| e.into_error(plugin.name()))?;
        }
        Ok(())
    }

    pub async fn process_assets(
        &self,
        ctx: &mut HookContext<'_>,
        bundle: &mut OutputBundle,
    ) -> crate::Result<()> {
        for plugin in &self.plugins {
            debug!(plugin = plugin.name(), "process_assets");
            plugin
                .process_assets(ctx, bundle)
                .await
                .map_err(|e| e.into_error(plugin.name()))?;
        }
        Ok(())
    }

    pub async fn after_emit(
        &self,
        ctx: &mut HookContext<'_>,
        bundle: &OutputBundle,
    ) -> crate::Result<()> {
        for plugin in &self.plugins {
            debug!(plugin = plugin.name(), "after_emit");
            plugin
                .after_emit(ctx, bundle)
                .await
                .map_err(|e| e.into_error(plugin.name()))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Ordered plugin specs plus the registry used to instantiate them.
pub struct PluginPipeline {
    specs: Vec<PluginSpec>,
    registry: PluginRegistry,
}

impl PluginPipeline {
    pub fn new(specs: Vec<PluginSpec>) -> Self {
        Self {
            specs,
            registry: PluginRegistry::default(),
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(config.plugins().to_vec())
    }

    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn specs(&self) -> &[PluginSpec] {
        &self.specs
    }

    /// Instantiate every plugin with its options, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first unknown plugin name or rejected option set.
    pub fn assemble(&self, config: &BuildConfig) -> Result<PluginSet, PluginConfigError> {
        let plugins = self
            .specs
            .iter()
            .map(|spec| self.registry.instantiate(spec, config))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(plugins = ?plugins.iter().map(|p| p.name()).collect::<Vec<_>>(), "assembled plugin pipeline");
        Ok(PluginSet::new(plugins))
    }
}

/// Decode a plugin's raw option table into its typed options.
///
/// `null` counts as an empty table; unknown keys are rejected by the
/// options types themselves (`deny_unknown_fields`).
pub fn decode_options<T: DeserializeOwned>(
    plugin: &str,
    options: &Value,
) -> Result<T, PluginConfigError> {
    let table = match options {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(_) => options.clone(),
        other => {
            return Err(PluginConfigError::InvalidOptions {
                plugin: plugin.to_string(),
                reason: format!("expected a table of options, found {}", value_kind(other)),
            });
        }
    };

    serde_json::from_value(table).map_err(|e| PluginConfigError::InvalidOptions {
        plugin: plugin.to_string(),
        reason: e.to_string(),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
