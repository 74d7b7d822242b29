//! Built-in per-entry emitter.
//!
//! Each entry is emitted as its own bundle after being matched against the
//! module rules. No transpilation happens here; projects that need it select
//! the command engine.

use std::path::Path;

use async_trait::async_trait;
use kiln_config::{BuildConfig, ModuleRule, SourceMapMode};
use regex::Regex;
use tracing::debug;

use super::{BundleEngine, Compilation};
use crate::asset::{Asset, OutputBundle};
use crate::diagnostics::{Diagnostic, DiagnosticSource};
use crate::naming::render_filename;
use crate::sourcemap::{SourceMap, external_comment};

#[derive(Debug, Clone, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }
}

struct CompiledRule {
    test: Regex,
    exclude: Option<Regex>,
    loaders: Vec<String>,
}

impl CompiledRule {
    fn compile(rule: &ModuleRule) -> Result<Self, regex::Error> {
        Ok(Self {
            test: Regex::new(&rule.test)?,
            exclude: rule.exclude.as_deref().map(Regex::new).transpose()?,
            loaders: rule.loaders.clone(),
        })
    }

    fn matches(&self, path: &str) -> bool {
        self.test.is_match(path) && !self.exclude.as_ref().is_some_and(|ex| ex.is_match(path))
    }
}

#[async_trait]
impl BundleEngine for NativeEngine {
    fn name(&self) -> &str {
        "native"
    }

    async fn compile(&self, config: &BuildConfig) -> crate::Result<Compilation> {
        let mut compilation = Compilation::default();

        let rules = match config
            .module_rules()
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(rules) => rules,
            Err(e) => {
                compilation.diagnostics.push(Diagnostic::error(
                    DiagnosticSource::Bundler,
                    format!("invalid module rule: {e}"),
                ));
                return Ok(compilation);
            }
        };

        for (name, path) in config.entries() {
            let display = path.to_string_lossy().replace('\\', "/");

            let Some(rule) = rules.iter().find(|rule| rule.matches(&display)) else {
                compilation.diagnostics.push(
                    Diagnostic::error(
                        DiagnosticSource::Bundler,
                        format!("no rule matches entry '{name}'"),
                    )
                    .with_file(display),
                );
                continue;
            };

            let source = match tokio::fs::read_to_string(path).await {
                Ok(source) => source,
                Err(e) => {
                    compilation.diagnostics.push(
                        Diagnostic::error(
                            DiagnosticSource::Bundler,
                            format!("cannot read entry '{name}': {e}"),
                        )
                        .with_file(display),
                    );
                    continue;
                }
            };

            debug!(entry = %name, loaders = ?rule.loaders, "emitting entry");
            emit_entry(&mut compilation.bundle, config, name, path, source);
        }

        Ok(compilation)
    }
}

fn emit_entry(bundle: &mut OutputBundle, config: &BuildConfig, name: &str, path: &Path, source: String) {
    let mut code = source;
    if !code.ends_with('\n') {
        code.push('\n');
    }

    let filename = render_filename(&config.output().filename, name, code.as_bytes());
    let source_name = path
        .strip_prefix(config.root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    match config.source_map() {
        SourceMapMode::Disabled => {
            bundle.push(Asset::entry(name, filename, code.into_bytes()));
        }
        SourceMapMode::Inline => {
            let map = SourceMap::identity(basename(&filename), source_name, &code);
            code.push_str(&map.inline_comment());
            code.push('\n');
            bundle.push(Asset::entry(name, filename, code.into_bytes()));
        }
        SourceMapMode::External => {
            let map_filename = format!("{filename}.map");
            let map = SourceMap::identity(basename(&filename), source_name, &code);
            code.push_str(&external_comment(basename(&map_filename)));
            code.push('\n');
            bundle.push(Asset::entry(name, filename, code.into_bytes()));
            bundle.push(Asset::source_map(name, map_filename, map.to_json().into_bytes()));
        }
    }
}

fn basename(filename: &str) -> &str {
    filename.rsplit('/').next().unwrap_or(filename)
}
