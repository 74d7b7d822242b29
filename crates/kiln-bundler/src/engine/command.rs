//! Engine delegating to an external bundler executable (esbuild-compatible
//! flags). Outputs go to a staging directory first and are read back so
//! plugins see them like any other asset.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use kiln_config::{BuildConfig, SourceMapMode};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{BundleEngine, Compilation};
use crate::asset::Asset;
use crate::diagnostics::{Diagnostic, DiagnosticSource};
use crate::naming::render_filename;
use crate::sourcemap::external_comment;

#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argument list for one entry.
    pub fn command_args(&self, config: &BuildConfig, entry: &Path, outfile: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(entry.to_string_lossy().into_owned());
        args.push("--bundle".to_string());
        args.push(format!("--outfile={}", outfile.display()));
        match config.source_map() {
            SourceMapMode::Inline => args.push("--sourcemap=inline".to_string()),
            // `linked` writes the map and the trailing sourceMappingURL comment
            SourceMapMode::External => args.push("--sourcemap=linked".to_string()),
            SourceMapMode::Disabled => {}
        }
        if config.is_production() {
            args.push("--minify".to_string());
        }
        args
    }
}

#[async_trait]
impl BundleEngine for CommandEngine {
    fn name(&self) -> &str {
        "command"
    }

    async fn compile(&self, config: &BuildConfig) -> crate::Result<Compilation> {
        let staging = staging_dir();
        fs::create_dir_all(&staging).await?;

        let result = self.compile_into(config, &staging).await;

        if let Err(e) = fs::remove_dir_all(&staging).await {
            warn!("Failed to remove staging directory '{}': {}", staging.display(), e);
        }
        result
    }
}

impl CommandEngine {
    async fn compile_into(&self, config: &BuildConfig, staging: &Path) -> crate::Result<Compilation> {
        let mut compilation = Compilation::default();

        for (name, entry) in config.entries() {
            let outfile = staging.join(format!("{name}.js"));
            let args = self.command_args(config, entry, &outfile);
            debug!(program = %self.program, ?args, "running external bundler");

            let output = match Command::new(&self.program)
                .args(&args)
                .current_dir(config.root())
                .kill_on_drop(true)
                .output()
                .await
            {
                Ok(output) => output,
                Err(e) => {
                    compilation.diagnostics.push(Diagnostic::error(
                        DiagnosticSource::Bundler,
                        format!("failed to run '{}': {e}", self.program),
                    ));
                    return Ok(compilation);
                }
            };

            let stderr = String::from_utf8_lossy(&output.stderr);
            let failed = !output.status.success();
            for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let diagnostic = if failed {
                    Diagnostic::error(DiagnosticSource::Bundler, line)
                } else {
                    Diagnostic::warning(DiagnosticSource::Bundler, line)
                };
                compilation.diagnostics.push(diagnostic.with_file(entry.to_string_lossy()));
            }

            if failed {
                if stderr.trim().is_empty() {
                    compilation.diagnostics.push(Diagnostic::error(
                        DiagnosticSource::Bundler,
                        format!("'{}' exited with {} for entry '{name}'", self.program, output.status),
                    ));
                }
                continue;
            }

            let code = fs::read(&outfile).await?;
            let filename = render_filename(&config.output().filename, name, &code);

            let map_path = staging.join(format!("{name}.js.map"));
            if fs::try_exists(&map_path).await? {
                let map_filename = format!("{filename}.map");
                let code = relink_source_map(code, &format!("{name}.js.map"), &map_filename);
                compilation.bundle.push(Asset::entry(name, filename, code));
                compilation
                    .bundle
                    .push(Asset::source_map(name, map_filename, fs::read(&map_path).await?));
            } else {
                compilation.bundle.push(Asset::entry(name, filename, code));
            }
        }

        Ok(compilation)
    }
}

/// Point the trailing `sourceMappingURL` at the renamed map file.
fn relink_source_map(code: Vec<u8>, staged: &str, emitted: &str) -> Vec<u8> {
    let emitted_base = emitted.rsplit('/').next().unwrap_or(emitted);
    match String::from_utf8(code) {
        Ok(text) => text
            .replace(&external_comment(staged), &external_comment(emitted_base))
            .into_bytes(),
        Err(e) => e.into_bytes(),
    }
}

fn staging_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("kiln-{}-{nanos}", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{ConfigResolver, ProjectConfig};

    fn config(env: &str) -> BuildConfig {
        ConfigResolver::new(ProjectConfig::default(), "/project")
            .resolve_str(env)
            .unwrap()
    }

    #[test]
    fn production_args_minify_without_maps() {
        let engine = CommandEngine::new("esbuild", vec!["--target=es2019".to_string()]);
        let args = engine.command_args(
            &config("production"),
            Path::new("/project/static/js/src/index.tsx"),
            Path::new("/tmp/stage/main.js"),
        );
        assert_eq!(
            args,
            vec![
                "--target=es2019",
                "/project/static/js/src/index.tsx",
                "--bundle",
                "--outfile=/tmp/stage/main.js",
                "--minify",
            ]
        );
    }

    #[test]
    fn development_args_request_inline_maps() {
        let engine = CommandEngine::new("esbuild", vec![]);
        let args = engine.command_args(
            &config("development"),
            Path::new("/e.tsx"),
            Path::new("/o.js"),
        );
        assert!(args.contains(&"--sourcemap=inline".to_string()));
        assert!(!args.contains(&"--minify".to_string()));
    }

    #[test]
    fn external_maps_keep_the_url_comment() {
        let project =
            ProjectConfig::from_value(serde_json::json!({ "source_map": "external" })).unwrap();
        let config = ConfigResolver::new(project, "/project")
            .resolve_str("development")
            .unwrap();
        let args = CommandEngine::new("esbuild", vec![]).command_args(
            &config,
            Path::new("/e.tsx"),
            Path::new("/o.js"),
        );
        assert!(args.contains(&"--sourcemap=linked".to_string()));
        assert!(!args.iter().any(|a| a == "--sourcemap=external"));
    }

    #[test]
    fn relinks_renamed_map() {
        let code = b"x();\n//# sourceMappingURL=main.js.map\n".to_vec();
        let out = relink_source_map(code, "main.js.map", "main.abcd1234.js.map");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "x();\n//# sourceMappingURL=main.abcd1234.js.map\n"
        );
    }

    #[tokio::test]
    async fn missing_program_is_an_error_diagnostic() {
        let engine = CommandEngine::new("kiln-test-missing-bundler", vec![]);
        let compilation = engine.compile(&config("production")).await.unwrap();
        assert!(compilation.bundle.is_empty());
        assert!(crate::diagnostics::has_errors(&compilation.diagnostics));
    }
}
