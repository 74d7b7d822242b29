//! `manifest`: emits a JSON map from logical asset names to emitted files.

use std::path::PathBuf;

use async_trait::async_trait;
use kiln_config::BuildConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{HookContext, Plugin, PluginError};
use crate::asset::{Asset, OutputBundle};
use crate::manifest::AssetManifest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestOptions {
    pub file_name: String,

    /// Prefix prepended to every emitted filename
    pub public_path: String,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            file_name: "manifest.json".to_string(),
            public_path: String::new(),
        }
    }
}

#[derive(Debug)]
pub struct ManifestPlugin {
    options: ManifestOptions,
}

impl ManifestPlugin {
    pub fn new(options: ManifestOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Plugin for ManifestPlugin {
    fn name(&self) -> &str {
        "manifest"
    }

    fn watch_ignores(&self, config: &BuildConfig) -> Vec<PathBuf> {
        vec![config.output_dir().join(&self.options.file_name)]
    }

    async fn process_assets(
        &self,
        _ctx: &mut HookContext<'_>,
        bundle: &mut OutputBundle,
    ) -> Result<(), PluginError> {
        let manifest = AssetManifest::from_bundle(bundle, &self.options.public_path);
        let json = manifest
            .to_json_pretty()
            .map_err(|e| PluginError::Failed(format!("failed to serialize manifest: {e}")))?;

        debug!(file = %self.options.file_name, entries = manifest.len(), "emitting manifest");
        bundle.push(Asset::auxiliary(
            self.options.file_name.clone(),
            json.into_bytes(),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{ConfigResolver, ProjectConfig};

    #[tokio::test]
    async fn adds_manifest_asset_with_public_path() {
        let config = ConfigResolver::new(ProjectConfig::default(), "/project")
            .resolve_str("production")
            .unwrap();
        let mut bundle = OutputBundle::new();
        bundle.push(Asset::entry("main", "main.js", b"x".to_vec()));

        let plugin = ManifestPlugin::new(ManifestOptions {
            file_name: "asset-manifest.json".to_string(),
            public_path: "/static/js/dist/".to_string(),
        });
        plugin
            .process_assets(&mut HookContext::new(&config), &mut bundle)
            .await
            .unwrap();

        let asset = bundle.get("asset-manifest.json").unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&asset.source).unwrap();
        assert_eq!(parsed["main.js"], "/static/js/dist/main.js");
        assert_eq!(
            plugin.watch_ignores(&config),
            vec![PathBuf::from("/project/static/js/dist/asset-manifest.json")]
        );
    }
}
