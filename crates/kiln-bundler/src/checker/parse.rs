//! Parsers for `tsc --pretty false` and `eslint --format json` output.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::diagnostics::{Diagnostic, DiagnosticSource};

// src/App.tsx(12,5): error TS2322: Type 'string' is not assignable to type 'number'.
static TSC_LOCATED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\((\d+),(\d+)\): (error|warning) TS(\d+): (.*)$").ok()
});

// error TS5083: Cannot read file 'tsconfig.json'.
static TSC_GLOBAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(error|warning) TS(\d+): (.*)$").ok());

/// Parse tsc output. Indented continuation lines are folded into the
/// preceding diagnostic's message.
pub fn parse_tsc_output(output: &str) -> Vec<Diagnostic> {
    let (Some(located), Some(global)) = (TSC_LOCATED.as_ref(), TSC_GLOBAL.as_ref()) else {
        return Vec::new();
    };

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = located.captures(line) {
            let diagnostic = new_diagnostic(DiagnosticSource::TypeScript, &caps[4], &caps[6])
                .with_file(&caps[1])
                .with_position(parse_u32(&caps[2]), parse_u32(&caps[3]))
                .with_code(format!("TS{}", &caps[5]));
            diagnostics.push(diagnostic);
        } else if let Some(caps) = global.captures(line) {
            diagnostics.push(
                new_diagnostic(DiagnosticSource::TypeScript, &caps[1], &caps[3])
                    .with_code(format!("TS{}", &caps[2])),
            );
        } else if line.starts_with(char::is_whitespace) {
            if let Some(last) = diagnostics.last_mut() {
                last.message.push('\n');
                last.message.push_str(line.trim());
            }
        }
    }
    diagnostics
}

/// One file in eslint's JSON report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintFileResult {
    file_path: String,
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintMessage {
    #[serde(default)]
    rule_id: Option<String>,
    /// 1 = warning, 2 = error
    severity: u8,
    message: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
}

/// Parse `eslint --format json` output.
///
/// Empty output means nothing was linted.
///
/// # Errors
///
/// Fails when stdout is not an eslint JSON report.
pub fn parse_eslint_output(output: &str) -> Result<Vec<Diagnostic>, serde_json::Error> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let results: Vec<EslintFileResult> = serde_json::from_str(output)?;
    let diagnostics = results
        .into_iter()
        .flat_map(|file| {
            let path = file.file_path;
            file.messages.into_iter().map(move |msg| {
                let severity = if msg.severity >= 2 { "error" } else { "warning" };
                let mut diagnostic =
                    new_diagnostic(DiagnosticSource::ESLint, severity, &msg.message)
                        .with_file(path.clone());
                if let (Some(line), Some(column)) = (msg.line, msg.column) {
                    diagnostic = diagnostic.with_position(line, column);
                }
                if let Some(rule) = msg.rule_id {
                    diagnostic = diagnostic.with_code(rule);
                }
                diagnostic
            })
        })
        .collect();
    Ok(diagnostics)
}

/// Numeric part of a `TSxxxx` code.
pub fn tsc_code_number(diagnostic: &Diagnostic) -> Option<u32> {
    diagnostic
        .code
        .as_deref()
        .and_then(|code| code.strip_prefix("TS"))
        .and_then(|n| n.parse().ok())
}

/// TS1xxx codes are reported by the parser; everything else is semantic.
pub fn is_syntactic(diagnostic: &Diagnostic) -> bool {
    matches!(tsc_code_number(diagnostic), Some(1000..=1999))
}

fn new_diagnostic(source: DiagnosticSource, severity: &str, message: &str) -> Diagnostic {
    if severity == "warning" {
        Diagnostic::warning(source, message)
    } else {
        Diagnostic::error(source, message)
    }
}

fn parse_u32(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}
