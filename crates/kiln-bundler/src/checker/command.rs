use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::parse::{is_syntactic, parse_eslint_output, parse_tsc_output};
use super::{CheckReport, CheckRequest, Checker};
use crate::diagnostics::{Diagnostic, DiagnosticSource};
use crate::plugins::{EslintOptions, TypeScriptMode, TypeScriptOptions};

/// Checker that shells out to `tsc` and `eslint`.
///
/// Tools are looked up in `<root>/node_modules/.bin` first, then on `PATH`,
/// unless an explicit program was configured.
#[derive(Debug, Clone, Default)]
pub struct CommandChecker {
    tsc: Option<PathBuf>,
    eslint: Option<PathBuf>,
}

impl CommandChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tsc(mut self, program: impl Into<PathBuf>) -> Self {
        self.tsc = Some(program.into());
        self
    }

    pub fn with_eslint(mut self, program: impl Into<PathBuf>) -> Self {
        self.eslint = Some(program.into());
        self
    }

    async fn run_tsc(&self, root: &Path, options: &TypeScriptOptions) -> Vec<Diagnostic> {
        let program = self
            .tsc
            .clone()
            .unwrap_or_else(|| locate_tool(root, "tsc"));
        let args = tsc_args(options);
        debug!(program = %program.display(), ?args, "running type checker");

        let output = match run(&program, &args, root, DiagnosticSource::TypeScript).await {
            Ok(output) => output,
            Err(diagnostic) => return vec![diagnostic],
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let filter = &options.diagnostic_options;
        let mut diagnostics: Vec<Diagnostic> = parse_tsc_output(&stdout)
            .into_iter()
            .filter(|d| {
                if is_syntactic(d) {
                    filter.syntactic
                } else {
                    filter.semantic
                }
            })
            .collect();

        if !output.status.success() && diagnostics.is_empty() && !filter_hides_everything(options) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            diagnostics.push(Diagnostic::error(
                DiagnosticSource::TypeScript,
                format!("tsc exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        diagnostics
    }

    async fn run_eslint(&self, root: &Path, options: &EslintOptions) -> Vec<Diagnostic> {
        let program = self
            .eslint
            .clone()
            .unwrap_or_else(|| locate_tool(root, "eslint"));
        let args = eslint_args(options);
        debug!(program = %program.display(), ?args, "running linter");

        let output = match run(&program, &args, root, DiagnosticSource::ESLint).await {
            Ok(output) => output,
            Err(diagnostic) => return vec![diagnostic],
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut diagnostics = match parse_eslint_output(&stdout) {
            Ok(diagnostics) => diagnostics,
            Err(e) => {
                warn!(error = %e, "unreadable eslint report");
                vec![Diagnostic::error(
                    DiagnosticSource::ESLint,
                    format!("could not read eslint report: {e}"),
                )]
            }
        };

        // eslint exits with 2 on configuration or crash, 1 on lint errors
        if output.status.code() == Some(2) {
            diagnostics.push(Diagnostic::error(
                DiagnosticSource::ESLint,
                format!("eslint failed: {}", stderr.trim()),
            ));
        }
        diagnostics
    }
}

#[async_trait]
impl Checker for CommandChecker {
    async fn check(&self, request: CheckRequest) -> CheckReport {
        let mut report = CheckReport::default();
        if let Some(typescript) = &request.typescript {
            report.typescript = self.run_tsc(&request.root, typescript).await;
        }
        if let Some(eslint) = &request.eslint {
            report.eslint = self.run_eslint(&request.root, eslint).await;
        }
        report
    }
}

fn filter_hides_everything(options: &TypeScriptOptions) -> bool {
    !options.diagnostic_options.semantic && !options.diagnostic_options.syntactic
}

fn locate_tool(root: &Path, name: &str) -> PathBuf {
    let local = root.join("node_modules").join(".bin").join(name);
    if local.is_file() {
        local
    } else {
        PathBuf::from(name)
    }
}

pub(crate) fn tsc_args(options: &TypeScriptOptions) -> Vec<String> {
    let config = options.config_file.as_str();
    let mut args = match options.mode {
        TypeScriptMode::Readonly => vec!["--project", config, "--noEmit"],
        TypeScriptMode::WriteTsbuildinfo => vec!["--project", config, "--noEmit", "--incremental"],
        TypeScriptMode::WriteReferences => vec!["--build", config],
        TypeScriptMode::WriteDts => {
            vec!["--project", config, "--declaration", "--emitDeclarationOnly"]
        }
    };
    args.extend(["--pretty", "false"]);
    args.into_iter().map(String::from).collect()
}

pub(crate) fn eslint_args(options: &EslintOptions) -> Vec<String> {
    let mut args = vec!["--format".to_string(), "json".to_string()];
    if options.fix {
        args.push("--fix".to_string());
    }
    args.push(options.files.clone());
    args
}

async fn run(
    program: &Path,
    args: &[String],
    cwd: &Path,
    source: DiagnosticSource,
) -> Result<Output, Diagnostic> {
    Command::new(program)
        .args(args)
        .current_dir(cwd)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            let message = if e.kind() == ErrorKind::NotFound {
                format!("'{}' not found, skipping", program.display())
            } else {
                format!("failed to run '{}': {e}", program.display())
            };
            warn!("{message}");
            Diagnostic::warning(source, message)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::DiagnosticOptions;

    fn ts(mode: TypeScriptMode) -> TypeScriptOptions {
        TypeScriptOptions {
            mode,
            ..TypeScriptOptions::default()
        }
    }

    #[test]
    fn tsc_args_follow_mode() {
        assert_eq!(
            tsc_args(&ts(TypeScriptMode::Readonly)),
            vec!["--project", "tsconfig.json", "--noEmit", "--pretty", "false"]
        );
        assert_eq!(
            tsc_args(&ts(TypeScriptMode::WriteReferences)),
            vec!["--build", "tsconfig.json", "--pretty", "false"]
        );
        assert!(tsc_args(&ts(TypeScriptMode::WriteDts)).contains(&"--emitDeclarationOnly".to_string()));
        assert!(tsc_args(&ts(TypeScriptMode::WriteTsbuildinfo)).contains(&"--incremental".to_string()));
    }

    #[test]
    fn eslint_fix_flag_is_optional() {
        let mut options = EslintOptions {
            files: "src/**/*.ts".to_string(),
            ..EslintOptions::default()
        };
        assert_eq!(eslint_args(&options), vec!["--format", "json", "src/**/*.ts"]);
        options.fix = true;
        assert_eq!(
            eslint_args(&options),
            vec!["--format", "json", "--fix", "src/**/*.ts"]
        );
    }

    #[tokio::test]
    async fn missing_tools_become_warnings() {
        let dir = tempfile::TempDir::new().unwrap();
        let checker = CommandChecker::new()
            .with_tsc("kiln-test-missing-tsc")
            .with_eslint("kiln-test-missing-eslint");
        let report = checker
            .check(CheckRequest {
                root: dir.path().to_path_buf(),
                typescript: Some(TypeScriptOptions {
                    diagnostic_options: DiagnosticOptions {
                        semantic: true,
                        syntactic: true,
                    },
                    ..TypeScriptOptions::default()
                }),
                eslint: Some(EslintOptions::default()),
            })
            .await;

        assert_eq!(report.typescript.len(), 1);
        assert_eq!(report.eslint.len(), 1);
        assert!(!report.has_type_errors());
        assert!(!report.has_lint_errors());
        assert!(report.typescript[0].message.contains("not found"));
    }
}
