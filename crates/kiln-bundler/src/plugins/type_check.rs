//! `type-check`: runs the type checker and linter after the bundle is written.
//!
//! The checker runs on a spawned task so the engine's own future is never
//! blocked on child processes; the hook awaits its completion report.
//! Diagnostics are always surfaced through the hook context. They only fail
//! the build when `fail_build` is set.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{HookContext, Plugin, PluginError};
use crate::asset::OutputBundle;
use crate::checker::{CheckRequest, Checker};
use crate::diagnostics::Diagnostic;

/// How much tsc may write while checking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeScriptMode {
    /// `tsc --noEmit`
    #[default]
    Readonly,
    /// `--noEmit --incremental`, keeps `.tsbuildinfo` between runs
    WriteTsbuildinfo,
    /// `tsc --build`: writes the outputs of referenced projects.
    ///
    /// Build mode also emits the root project unless its tsconfig sets
    /// `noEmit` or `emitDeclarationOnly`, so set one of those when the
    /// bundler is meant to own the JavaScript output.
    WriteReferences,
    /// Declarations only
    WriteDts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticOptions {
    pub semantic: bool,
    pub syntactic: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            semantic: true,
            syntactic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeScriptOptions {
    pub enabled: bool,
    /// Relative to the project root
    pub config_file: String,
    pub diagnostic_options: DiagnosticOptions,
    pub mode: TypeScriptMode,
}

impl Default for TypeScriptOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            config_file: "tsconfig.json".to_string(),
            diagnostic_options: DiagnosticOptions::default(),
            mode: TypeScriptMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EslintOptions {
    pub enabled: bool,
    /// Glob handed to eslint
    pub files: String,
    pub fix: bool,
}

impl Default for EslintOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            files: "**/*.{ts,tsx,js,jsx}".to_string(),
            fix: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeCheckOptions {
    pub typescript: TypeScriptOptions,
    /// Linting is off unless an `eslint` table is present
    pub eslint: Option<EslintOptions>,
    pub fail_build: bool,
}

pub struct TypeCheckPlugin {
    options: TypeCheckOptions,
    checker: Arc<dyn Checker>,
}

impl TypeCheckPlugin {
    pub fn new(options: TypeCheckOptions, checker: Arc<dyn Checker>) -> Self {
        Self { options, checker }
    }

    pub fn options(&self) -> &TypeCheckOptions {
        &self.options
    }

    fn request(&self, ctx: &HookContext<'_>) -> Option<CheckRequest> {
        let typescript = Some(self.options.typescript.clone()).filter(|ts| ts.enabled);
        let eslint = self.options.eslint.clone().filter(|es| es.enabled);
        if typescript.is_none() && eslint.is_none() {
            return None;
        }
        Some(CheckRequest {
            root: ctx.config().root().to_path_buf(),
            typescript,
            eslint,
        })
    }
}

#[async_trait]
impl Plugin for TypeCheckPlugin {
    fn name(&self) -> &str {
        "type-check"
    }

    async fn after_emit(
        &self,
        ctx: &mut HookContext<'_>,
        _bundle: &OutputBundle,
    ) -> Result<(), PluginError> {
        let Some(request) = self.request(ctx) else {
            debug!("type-check: typescript and eslint both disabled");
            return Ok(());
        };

        let checker = Arc::clone(&self.checker);
        let report = tokio::spawn(async move { checker.check(request).await })
            .await
            .map_err(|e| PluginError::Failed(format!("checker task failed: {e}")))?;

        for diagnostic in report.iter() {
            if diagnostic.is_error() {
                warn!("{diagnostic}");
            } else {
                info!("{diagnostic}");
            }
            ctx.report(diagnostic.clone());
        }

        if report.is_clean() {
            debug!("type-check: no issues found");
        }

        if self.options.fail_build {
            if report.has_type_errors() {
                return Err(PluginError::TypeCheck(errors_only(&report.typescript)));
            }
            if report.has_lint_errors() {
                return Err(PluginError::Lint(errors_only(&report.eslint)));
            }
        }
        Ok(())
    }
}

fn errors_only(diagnostics: &[Diagnostic]) -> Vec<Diagnostic> {
    diagnostics.iter().filter(|d| d.is_error()).cloned().collect()
}
