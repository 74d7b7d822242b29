//! In-memory build output.

use serde::Serialize;

/// What an asset represents; the manifest keys off this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetKind {
    /// Bundle emitted for the named entry
    Entry { name: String },
    /// External source map for the named entry
    SourceMap { entry: String },
    /// Anything a plugin adds (manifest, reports)
    Auxiliary,
}

#[derive(Debug, Clone)]
pub struct Asset {
    /// Path relative to the output directory
    pub filename: String,
    pub kind: AssetKind,
    pub source: Vec<u8>,
}

impl Asset {
    pub fn entry(name: impl Into<String>, filename: impl Into<String>, source: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            kind: AssetKind::Entry { name: name.into() },
            source,
        }
    }

    pub fn source_map(entry: impl Into<String>, filename: impl Into<String>, source: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            kind: AssetKind::SourceMap {
                entry: entry.into(),
            },
            source,
        }
    }

    pub fn auxiliary(filename: impl Into<String>, source: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            kind: AssetKind::Auxiliary,
            source,
        }
    }

    pub fn size(&self) -> usize {
        self.source.len()
    }

    /// Logical name used as the manifest key (`main.js`, `main.js.map`).
    pub fn logical_name(&self) -> Option<String> {
        match &self.kind {
            AssetKind::Entry { name } => Some(format!("{name}.js")),
            AssetKind::SourceMap { entry } => Some(format!("{entry}.js.map")),
            AssetKind::Auxiliary => None,
        }
    }
}

/// Ordered collection of assets produced by one build.
#[derive(Debug, Clone, Default)]
pub struct OutputBundle {
    assets: Vec<Asset>,
}

impl OutputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn get(&self, filename: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.filename == filename)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Asset> {
        self.assets
            .iter()
            .filter(|a| matches!(a.kind, AssetKind::Entry { .. }))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub(crate) fn summarize(&self) -> Vec<EmittedAsset> {
        self.assets
            .iter()
            .map(|asset| EmittedAsset {
                filename: asset.filename.clone(),
                kind: asset.kind.clone(),
                size: asset.size(),
            })
            .collect()
    }
}

/// Record of an asset after it has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedAsset {
    pub filename: String,
    pub kind: AssetKind,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_names_follow_entry_names() {
        let entry = Asset::entry("main", "main.3fa2b1c0.js", b"x".to_vec());
        let map = Asset::source_map("main", "main.3fa2b1c0.js.map", b"{}".to_vec());
        let aux = Asset::auxiliary("manifest.json", b"{}".to_vec());

        assert_eq!(entry.logical_name().as_deref(), Some("main.js"));
        assert_eq!(map.logical_name().as_deref(), Some("main.js.map"));
        assert_eq!(aux.logical_name(), None);
    }

    #[test]
    fn entries_filters_entry_bundles() {
        let mut bundle = OutputBundle::new();
        bundle.push(Asset::entry("a", "a.js", vec![]));
        bundle.push(Asset::source_map("a", "a.js.map", vec![]));
        bundle.push(Asset::entry("b", "b.js", vec![]));

        let names: Vec<_> = bundle.entries().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["a.js", "b.js"]);
        assert!(bundle.get("a.js.map").is_some());
    }
}
