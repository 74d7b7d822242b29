//! Single build invocation: engine run plus outcome mapping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kiln_config::BuildConfig;
use tracing::{debug, info};

use crate::Error;
use crate::asset::EmittedAsset;
use crate::diagnostics::Diagnostic;
use crate::engine::{BundleEngine, engine_for};
use crate::plugins::PluginSet;

/// Summary of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub assets: Vec<EmittedAsset>,
    /// Warnings, and errors that were not configured to fail the build
    pub diagnostics: Vec<Diagnostic>,
    pub duration: Duration,
}

impl BuildReport {
    pub fn total_size(&self) -> usize {
        self.assets.iter().map(|a| a.size).sum()
    }
}

#[derive(Debug)]
pub enum BuildOutcome {
    Success(BuildReport),
    Failure(Error),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success(_))
    }

    pub fn into_result(self) -> crate::Result<BuildReport> {
        match self {
            BuildOutcome::Success(report) => Ok(report),
            BuildOutcome::Failure(err) => Err(err),
        }
    }
}

/// Runs one build with the configured engine. Failures are reported, never
/// retried.
#[derive(Clone)]
pub struct BundleInvoker {
    engine: Arc<dyn BundleEngine>,
}

impl BundleInvoker {
    pub fn new(engine: Arc<dyn BundleEngine>) -> Self {
        Self { engine }
    }

    pub fn for_config(config: &BuildConfig) -> Self {
        Self::new(engine_for(config.engine()))
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub async fn invoke(&self, config: &BuildConfig, plugins: &PluginSet) -> BuildOutcome {
        let start = Instant::now();
        debug!(engine = self.engine.name(), mode = %config.mode(), "invoking bundler");

        match self.engine.run(config, plugins).await {
            Ok(report) if report.success => {
                let duration = start.elapsed();
                info!(assets = report.assets.len(), ?duration, "build succeeded");
                BuildOutcome::Success(BuildReport {
                    assets: report.assets,
                    diagnostics: report.diagnostics,
                    duration,
                })
            }
            Ok(report) => BuildOutcome::Failure(Error::Bundle(report.diagnostics)),
            Err(err) => BuildOutcome::Failure(err),
        }
    }
}

impl std::fmt::Debug for BundleInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleInvoker")
            .field("engine", &self.engine.name())
            .finish()
    }
}
