//! Environment-driven resolution of a `ProjectConfig` into a `BuildConfig`.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::environment::{BuildEnvironment, Mode};
use crate::error::Result;
use crate::helpers::default_plugins;
use crate::project::{ProjectConfig, WatchOptions};
use crate::types::{EngineSpec, ModuleRule, OutputOptions, PluginSpec, SourceMapMode};
use crate::validation::{ConfigValidator, SchemaValidator};

/// Fully resolved configuration for one driver invocation.
///
/// Produced by [`ConfigResolver`] and read-only afterwards: all paths are
/// absolute and the environment-derived fields always agree with `mode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfig {
    environment: BuildEnvironment,
    mode: Mode,
    root: PathBuf,
    entries: IndexMap<String, PathBuf>,
    output: OutputOptions,
    source_map: SourceMapMode,
    watch: bool,
    watch_options: WatchOptions,
    module_rules: Vec<ModuleRule>,
    plugins: Vec<PluginSpec>,
    engine: EngineSpec,
}

impl BuildConfig {
    pub fn environment(&self) -> BuildEnvironment {
        self.environment
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Project root the config was resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry name -> absolute source path
    pub fn entries(&self) -> &IndexMap<String, PathBuf> {
        &self.entries
    }

    /// Output options; `dir` is absolute
    pub fn output(&self) -> &OutputOptions {
        &self.output
    }

    pub fn output_dir(&self) -> &Path {
        &self.output.dir
    }

    pub fn source_map(&self) -> SourceMapMode {
        self.source_map
    }

    pub fn watch(&self) -> bool {
        self.watch
    }

    pub fn watch_options(&self) -> &WatchOptions {
        &self.watch_options
    }

    pub fn module_rules(&self) -> &[ModuleRule] {
        &self.module_rules
    }

    pub fn plugins(&self) -> &[PluginSpec] {
        &self.plugins
    }

    pub fn engine(&self) -> &EngineSpec {
        &self.engine
    }

    pub fn is_production(&self) -> bool {
        self.mode == Mode::Production
    }
}

/// Turns an environment indicator into a [`BuildConfig`].
///
/// # Example
///
/// ```
/// use kiln_config::{BuildEnvironment, ConfigResolver, ProjectConfig, SourceMapMode};
///
/// let resolver = ConfigResolver::new(ProjectConfig::default(), "/srv/app");
/// let config = resolver.resolve(BuildEnvironment::Production).unwrap();
///
/// assert_eq!(config.source_map(), SourceMapMode::Disabled);
/// assert!(!config.watch());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    project: ProjectConfig,
    root: PathBuf,
}

impl ConfigResolver {
    pub fn new(project: ProjectConfig, root: impl AsRef<Path>) -> Self {
        Self {
            project,
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    /// Parse an environment string, then resolve.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` for anything other than
    /// development/production (or their short forms).
    pub fn resolve_str(&self, environment: &str) -> Result<BuildConfig> {
        let env: BuildEnvironment = environment.parse()?;
        self.resolve(env)
    }

    /// Resolve the project for `env`. Touches no filesystem state.
    pub fn resolve(&self, env: BuildEnvironment) -> Result<BuildConfig> {
        let project = self.project.clone().materialize_profile(env.as_str())?;
        let mode = Mode::from(env);
        let base = self.root.join(&project.base_path);

        let source_map = match (env, project.source_map) {
            (BuildEnvironment::Production, _) => SourceMapMode::Disabled,
            (BuildEnvironment::Development, SourceMapMode::Disabled) => {
                warn!("source maps cannot be disabled in development, using inline maps");
                SourceMapMode::Inline
            }
            (BuildEnvironment::Development, mode) => mode,
        };

        let entries = project
            .entries
            .iter()
            .map(|(name, path)| (name.clone(), base.join(path)))
            .collect();

        let output = OutputOptions {
            dir: base.join(&project.output.dir),
            filename: project.output.filename.clone(),
        };

        let plugins = project.plugins.unwrap_or_else(|| default_plugins(env));

        let config = BuildConfig {
            environment: env,
            mode,
            root: self.root.clone(),
            entries,
            output,
            source_map,
            watch: env == BuildEnvironment::Development,
            watch_options: project.watch,
            module_rules: project.module_rules,
            plugins,
            engine: project.engine,
        };

        SchemaValidator.validate(&config)?;

        debug!(
            mode = %config.mode,
            entries = config.entries.len(),
            plugins = config.plugins.len(),
            "resolved build configuration"
        );

        Ok(config)
    }
}
