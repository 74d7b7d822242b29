//! Bundling engines.
//!
//! An engine only has to [`compile`](BundleEngine::compile) entries into an
//! in-memory [`OutputBundle`]; the provided [`run`](BundleEngine::run) wraps
//! that in the plugin lifecycle and writes the result:
//!
//! ```text
//! before_run -> compile -> process_assets -> write -> after_emit
//! ```
//!
//! Compilation errors stop the run before anything is written.

mod command;
mod native;

use std::sync::Arc;

use async_trait::async_trait;
use kiln_config::{BuildConfig, EngineSpec};
use serde::Serialize;
use tracing::{debug, info};

use crate::asset::{EmittedAsset, OutputBundle};
use crate::diagnostics::{Diagnostic, has_errors};
use crate::output::write_bundle_to;
use crate::plugins::{HookContext, PluginSet};

pub use command::CommandEngine;
pub use native::NativeEngine;

/// Result of [`BundleEngine::compile`].
#[derive(Debug, Default)]
pub struct Compilation {
    pub bundle: OutputBundle,
    pub diagnostics: Vec<Diagnostic>,
}

/// What one engine run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub success: bool,
    /// Compilation diagnostics followed by those reported by plugins
    pub diagnostics: Vec<Diagnostic>,
    /// Assets written to the output directory, empty on failure
    pub assets: Vec<EmittedAsset>,
}

#[async_trait]
pub trait BundleEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn compile(&self, config: &BuildConfig) -> crate::Result<Compilation>;

    /// Run one full build through the plugin hooks.
    ///
    /// # Errors
    ///
    /// Hook failures and write failures are returned as errors. Compilation
    /// errors are not: they yield an unsuccessful report.
    async fn run(&self, config: &BuildConfig, plugins: &PluginSet) -> crate::Result<EngineReport> {
        let mut ctx = HookContext::new(config);
        plugins.before_run(&mut ctx).await?;

        let Compilation {
            mut bundle,
            mut diagnostics,
        } = self.compile(config).await?;

        if has_errors(&diagnostics) {
            diagnostics.extend(ctx.into_diagnostics());
            return Ok(EngineReport {
                success: false,
                diagnostics,
                assets: Vec::new(),
            });
        }

        plugins.process_assets(&mut ctx, &mut bundle).await?;

        let written = write_bundle_to(&bundle, config.output_dir())?;
        info!(engine = self.name(), files = written.len(), dir = %config.output_dir().display(), "emitted bundle");

        plugins.after_emit(&mut ctx, &bundle).await?;

        diagnostics.extend(ctx.into_diagnostics());
        debug!(diagnostics = diagnostics.len(), "engine run finished");
        Ok(EngineReport {
            success: true,
            diagnostics,
            assets: bundle.summarize(),
        })
    }
}

/// Engine selected by the project's `[engine]` table.
pub fn engine_for(spec: &EngineSpec) -> Arc<dyn BundleEngine> {
    match spec {
        EngineSpec::Native => Arc::new(NativeEngine::new()),
        EngineSpec::Command { program, args } => {
            Arc::new(CommandEngine::new(program.clone(), args.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_for_matches_spec() {
        assert_eq!(engine_for(&EngineSpec::Native).name(), "native");
        let spec = EngineSpec::Command {
            program: "esbuild".to_string(),
            args: vec![],
        };
        assert_eq!(engine_for(&spec).name(), "command");
    }
}
