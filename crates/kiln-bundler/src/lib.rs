//! # kiln-bundler
//!
//! Plugin pipeline, bundling engines and the build invoker for kiln.
//!
//! ```no_run
//! use kiln_bundler::{BundleInvoker, PluginPipeline};
//! use kiln_config::{ConfigResolver, ProjectConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigResolver::new(ProjectConfig::default(), ".").resolve_str("production")?;
//! let plugins = PluginPipeline::from_config(&config).assemble(&config)?;
//! let report = BundleInvoker::for_config(&config)
//!     .invoke(&config, &plugins)
//!     .await
//!     .into_result()?;
//!
//! for asset in &report.assets {
//!     println!("{} ({} bytes)", asset.filename, asset.size);
//! }
//! # Ok(()) }
//! ```

pub mod asset;
pub mod checker;
pub mod diagnostics;
pub mod engine;
pub mod invoker;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod plugins;
pub mod sourcemap;

pub use asset::{Asset, AssetKind, EmittedAsset, OutputBundle};
pub use checker::{CheckReport, CheckRequest, Checker, CommandChecker};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, DiagnosticSource};
pub use engine::{BundleEngine, CommandEngine, Compilation, EngineReport, NativeEngine, engine_for};
pub use invoker::{BuildOutcome, BuildReport, BundleInvoker};
pub use manifest::AssetManifest;
pub use plugins::{
    HookContext, Plugin, PluginConfigError, PluginError, PluginHandle, PluginPipeline,
    PluginRegistry, PluginSet,
};

/// Error type for kiln-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The engine reported error diagnostics.
    #[error("bundling failed: {}", diagnostics::summarize(.0))]
    Bundle(Vec<Diagnostic>),

    /// The type checker reported errors and is configured to fail the build.
    #[error("type check failed: {}", diagnostics::summarize(.0))]
    TypeCheck(Vec<Diagnostic>),

    /// The linter reported errors and is configured to fail the build.
    #[error("lint failed: {}", diagnostics::summarize(.0))]
    Lint(Vec<Diagnostic>),

    /// A plugin hook failed.
    #[error("plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    /// A plugin's option set was rejected during assembly.
    #[error(transparent)]
    PluginConfig(#[from] PluginConfigError),

    #[error(transparent)]
    Config(#[from] kiln_config::ConfigError),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("write failure: {0}")]
    WriteFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for kiln-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Diagnostics carried by the error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Bundle(d) | Error::TypeCheck(d) | Error::Lint(d) => d,
            _ => &[],
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Bundle(_) => "kiln::bundle",
            Error::TypeCheck(_) => "kiln::type_check",
            Error::Lint(_) => "kiln::lint",
            Error::Plugin { .. } => "kiln::plugin",
            Error::PluginConfig(_) => "kiln::plugin_config",
            Error::Config(_) => "kiln::config",
            Error::InvalidOutputPath(_) => "kiln::output_path",
            Error::WriteFailure(_) => "kiln::write",
            Error::Io(_) => "kiln::io",
        }))
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        let help = match self {
            Error::TypeCheck(_) | Error::Lint(_) => {
                "set `fail_build = false` on the type-check plugin to report without failing"
            }
            Error::PluginConfig(_) => "check the [[plugins]] tables in kiln.toml",
            Error::InvalidOutputPath(_) => "output filenames must stay inside the output directory",
            _ => return None,
        };
        Some(Box::new(help))
    }
}
