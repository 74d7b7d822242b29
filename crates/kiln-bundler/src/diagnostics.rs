//! Diagnostics reported by engines, plugins and the checker.
//!
//! Every collaborator reports through the same cloneable, serializable shape
//! so the CLI can print them uniformly regardless of which tool produced them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which part of the pipeline produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSource {
    Bundler,
    Plugin,
    TypeScript,
    ESLint,
}

impl fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSource::Bundler => write!(f, "bundler"),
            DiagnosticSource::Plugin => write!(f, "plugin"),
            DiagnosticSource::TypeScript => write!(f, "typescript"),
            DiagnosticSource::ESLint => write!(f, "eslint"),
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Tool-specific code (`TS2322`, `no-unused-vars`, ...)
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn error(source: DiagnosticSource, message: impl Into<String>) -> Self {
        Self {
            source,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            code: None,
        }
    }

    pub fn warning(source: DiagnosticSource, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            ..Self::error(source, message)
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}")?;
            if let (Some(line), Some(column)) = (self.line, self.column) {
                write!(f, ":{line}:{column}")?;
            }
            write!(f, ": ")?;
        }

        let severity = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        write!(f, "{severity}")?;
        match &self.code {
            Some(code) => write!(f, "[{}/{code}]", self.source)?,
            None => write!(f, "[{}]", self.source)?,
        }
        write!(f, ": {}", self.message)
    }
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

/// One-line summary used in error messages.
pub(crate) fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "no diagnostics reported".to_string(),
        [single] => single.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
