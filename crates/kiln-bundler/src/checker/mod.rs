//! Type and lint checking collaborator used by the `type-check` plugin.

mod command;
pub mod parse;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::diagnostics::{Diagnostic, has_errors};
use crate::plugins::{EslintOptions, TypeScriptOptions};

pub use command::CommandChecker;

/// One checking job. A `None` tool is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckRequest {
    /// Working directory for the tools
    pub root: PathBuf,
    pub typescript: Option<TypeScriptOptions>,
    pub eslint: Option<EslintOptions>,
}

/// Completion report for a [`CheckRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub typescript: Vec<Diagnostic>,
    pub eslint: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn has_type_errors(&self) -> bool {
        has_errors(&self.typescript)
    }

    pub fn has_lint_errors(&self) -> bool {
        has_errors(&self.eslint)
    }

    pub fn is_clean(&self) -> bool {
        self.typescript.is_empty() && self.eslint.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.typescript.iter().chain(self.eslint.iter())
    }
}

/// Runs type checking and linting.
///
/// Checkers never fail: a tool that cannot be started is reported as a
/// warning diagnostic in the returned report.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, request: CheckRequest) -> CheckReport;
}
