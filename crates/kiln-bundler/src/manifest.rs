//! Asset manifest: logical asset name -> emitted (possibly hashed) filename.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::asset::OutputBundle;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
}

impl AssetManifest {
    /// Collect every entry bundle and source map of `bundle`, prefixing the
    /// emitted filenames with `public_path`.
    pub fn from_bundle(bundle: &OutputBundle, public_path: &str) -> Self {
        let entries = bundle
            .iter()
            .filter_map(|asset| {
                asset
                    .logical_name()
                    .map(|name| (name, format!("{public_path}{}", asset.filename)))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, logical_name: &str) -> Option<&str> {
        self.entries.get(logical_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
