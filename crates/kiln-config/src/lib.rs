//! Build configuration for kiln.
//!
//! A [`ProjectConfig`] is what the user writes (`kiln.toml`, or the `kiln`
//! field in `package.json`). A [`ConfigResolver`] turns it plus a
//! [`BuildEnvironment`] into an immutable [`BuildConfig`]:
//!
//! - production: optimized mode, no source maps, no watching
//! - development: inline (or external) source maps, watch mode
//!
//! ```
//! use kiln_config::{ConfigResolver, ProjectConfig};
//!
//! let resolver = ConfigResolver::new(ProjectConfig::default(), "/srv/app");
//! let config = resolver.resolve_str("development").unwrap();
//! assert!(config.watch());
//! assert!(resolver.resolve_str("staging").is_err());
//! ```

pub mod discovery;
pub mod environment;
pub mod error;
mod helpers;
pub mod project;
pub mod resolve;
pub mod types;
pub mod validation;

pub use discovery::{CONFIG_FILE_NAME, ConfigDiscovery, discover};
pub use environment::{BuildEnvironment, Mode};
pub use error::{ConfigError, Result};
pub use helpers::default_plugins;
pub use project::{ProjectConfig, WatchOptions};
pub use resolve::{BuildConfig, ConfigResolver};
pub use types::{EngineSpec, ModuleRule, OutputOptions, PluginSpec, SourceMapMode};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
