//! Line-identity source maps for emitted bundles.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Map every generated line to the same line of a single source.
    pub fn identity(file: impl Into<String>, source_name: impl Into<String>, content: &str) -> Self {
        Self {
            version: 3,
            file: file.into(),
            sources: vec![source_name.into()],
            sources_content: vec![content.to_string()],
            names: Vec::new(),
            mappings: identity_mappings(content.lines().count()),
        }
    }

    pub fn to_json(&self) -> String {
        // A struct of strings always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    /// `//# sourceMappingURL=` comment embedding the map as base64.
    pub fn inline_comment(&self) -> String {
        format!(
            "//# sourceMappingURL=data:application/json;charset=utf-8;base64,{}",
            STANDARD.encode(self.to_json())
        )
    }
}

/// Comment pointing at a sibling `.map` file.
pub fn external_comment(map_filename: &str) -> String {
    format!("//# sourceMappingURL={map_filename}")
}

/// VLQ mappings where generated line N maps to column 0 of source line N.
fn identity_mappings(lines: usize) -> String {
    if lines == 0 {
        return String::new();
    }
    let mut mappings = String::with_capacity(lines * 5);
    mappings.push_str("AAAA");
    for _ in 1..lines {
        mappings.push_str(";AACA");
    }
    mappings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mappings_advance_one_line_per_segment() {
        assert_eq!(identity_mappings(0), "");
        assert_eq!(identity_mappings(1), "AAAA");
        assert_eq!(identity_mappings(3), "AAAA;AACA;AACA");
    }

    #[test]
    fn inline_comment_round_trips_through_base64() {
        let map = SourceMap::identity("main.js", "src/index.tsx", "let a = 1;\nlet b = 2;\n");
        let comment = map.inline_comment();
        let encoded = comment.rsplit(',').next().unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        let parsed: SourceMap = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(parsed, map);
        assert_eq!(parsed.mappings, "AAAA;AACA");
    }
}
