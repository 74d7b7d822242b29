//! Build command implementation.
//!
//! 1. Resolve the project root (`--cwd` or the current directory)
//! 2. Load `kiln.toml` and resolve it for the requested environment
//! 3. Validate entries on disk and assemble the plugin pipeline
//! 4. Build once, or hand over to the watch session

use std::path::{Path, PathBuf};

use kiln_bundler::{BuildReport, BundleInvoker, PluginPipeline, PluginSet};
use kiln_config::{BuildConfig, ConfigDiscovery, ConfigResolver, ConfigValidator, FsValidator};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::{Result, ResultExt};
use crate::ui;
use crate::watch::WatchSession;

/// Everything a build needs, resolved and validated.
pub struct Prepared {
    pub config: BuildConfig,
    pub plugins: PluginSet,
    pub invoker: BundleInvoker,
}

/// Run kiln for the parsed command line.
///
/// # Errors
///
/// Configuration problems (unknown environment, missing entries, rejected
/// plugin options) fail before anything is built. In watch mode only setup
/// errors are returned; build failures are reported and watching continues.
pub async fn execute(args: &Cli) -> Result<()> {
    let prepared = prepare(args)?;
    let Prepared {
        config,
        plugins,
        invoker,
    } = &prepared;

    if config.watch() {
        WatchSession::new(config, plugins, invoker, args.quiet)
            .run()
            .await
    } else {
        build_once(config, plugins, invoker, args.quiet).await?;
        Ok(())
    }
}

/// Resolve, validate and assemble without building.
pub fn prepare(args: &Cli) -> Result<Prepared> {
    let cwd = match &args.cwd {
        Some(dir) => dir.canonicalize().with_path(dir)?,
        None => std::env::current_dir()?,
    };
    debug!(root = %cwd.display(), "resolved project root");

    let discovery = ConfigDiscovery::new(&cwd);
    let project = match &args.config {
        Some(path) => discovery.load_from(&resolve_path(path, &cwd))?,
        None => discovery.load()?,
    };

    let config = ConfigResolver::new(project, &cwd).resolve_str(&args.environment)?;
    FsValidator.validate(&config)?;

    let plugins = PluginPipeline::from_config(&config).assemble(&config)?;
    let invoker = BundleInvoker::for_config(&config);

    info!(
        environment = %config.environment(),
        engine = invoker.engine_name(),
        entries = config.entries().len(),
        plugins = plugins.len(),
        "configuration resolved"
    );

    Ok(Prepared {
        config,
        plugins,
        invoker,
    })
}

/// Run one build and report it on the terminal.
///
/// Diagnostics are printed whether or not the build succeeds.
pub async fn build_once(
    config: &BuildConfig,
    plugins: &PluginSet,
    invoker: &BundleInvoker,
    quiet: bool,
) -> Result<BuildReport> {
    let spinner = (!quiet && !ui::is_ci()).then(|| {
        ui::Spinner::new(&format!("Building ({})...", config.environment()))
    });

    let outcome = invoker.invoke(config, plugins).await.into_result();

    match outcome {
        Ok(report) => {
            if let Some(spinner) = &spinner {
                spinner.finish(&format!("Built {} assets", report.assets.len()));
            }
            if !quiet {
                print_diagnostics(&report.diagnostics);
                ui::print_build_summary(&report);
            }
            Ok(report)
        }
        Err(err) => {
            if let Some(spinner) = &spinner {
                spinner.fail("Build failed");
            }
            print_diagnostics(err.diagnostics());
            Err(err.into())
        }
    }
}

fn print_diagnostics(diagnostics: &[kiln_bundler::Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.is_error() {
            ui::error(&diagnostic.to_string());
        } else {
            ui::warning(&diagnostic.to_string());
        }
    }
}

/// Resolve a path relative to the working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
