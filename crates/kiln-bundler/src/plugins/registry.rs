//! Plugin registry keyed by plugin name.
//!
//! Each entry is a factory turning a raw option table into a ready plugin.
//! The built-in plugins are registered by [`PluginRegistry::builtin`]; extra
//! factories can be added with [`PluginRegistry::register`].

use std::collections::HashMap;
use std::sync::Arc;

use kiln_config::{BuildConfig, PluginSpec};
use serde_json::Value;

use super::{
    CleanPlugin, ManifestPlugin, PluginConfigError, PluginHandle, TypeCheckPlugin, decode_options,
};
use crate::checker::{Checker, CommandChecker};

/// Builds a plugin from its options and the resolved config.
pub type PluginFactory =
    Box<dyn Fn(&Value, &BuildConfig) -> Result<PluginHandle, PluginConfigError> + Send + Sync>;

pub struct PluginRegistry {
    factories: HashMap<String, PluginFactory>,
}

impl PluginRegistry {
    /// Create a registry with no plugins registered
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register `clean`, `manifest` and `type-check`, the latter backed by
    /// `checker`.
    pub fn builtin(checker: Arc<dyn Checker>) -> Self {
        let mut registry = Self::empty();

        registry.register("clean", |options, _config| {
            let options = decode_options("clean", options)?;
            Ok(Arc::new(CleanPlugin::new(options)) as PluginHandle)
        });

        registry.register("manifest", |options, _config| {
            let options = decode_options("manifest", options)?;
            Ok(Arc::new(ManifestPlugin::new(options)) as PluginHandle)
        });

        registry.register("type-check", move |options, _config| {
            let options = decode_options("type-check", options)?;
            Ok(Arc::new(TypeCheckPlugin::new(options, Arc::clone(&checker))) as PluginHandle)
        });

        registry
    }

    /// Replace the checker behind `type-check`, keeping other registrations.
    pub fn with_checker(mut self, checker: Arc<dyn Checker>) -> Self {
        self.register("type-check", move |options, _config| {
            let options = decode_options("type-check", options)?;
            Ok(Arc::new(TypeCheckPlugin::new(options, Arc::clone(&checker))) as PluginHandle)
        });
        self
    }

    /// Add or replace the factory for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value, &BuildConfig) -> Result<PluginHandle, PluginConfigError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn instantiate(
        &self,
        spec: &PluginSpec,
        config: &BuildConfig,
    ) -> Result<PluginHandle, PluginConfigError> {
        let factory =
            self.factories
                .get(&spec.name)
                .ok_or_else(|| PluginConfigError::UnknownPlugin {
                    plugin: spec.name.clone(),
                })?;
        factory(&spec.options, config)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin(Arc::new(CommandChecker::default()))
    }
}
