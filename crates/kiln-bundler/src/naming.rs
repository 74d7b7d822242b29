//! Output filename patterns.

/// Number of hex characters kept from the content hash.
pub const HASH_LENGTH: usize = 8;

/// Expand `[name]`, `[hash]` and `[contenthash]` in an output pattern.
///
/// Both hash tokens expand to the same blake3 digest of `content`, so a
/// bundle's name changes exactly when its bytes do.
///
/// ```
/// use kiln_bundler::naming::render_filename;
///
/// assert_eq!(render_filename("[name].js", "main", b"x"), "main.js");
/// let hashed = render_filename("[name].[contenthash].js", "main", b"x");
/// assert!(hashed.starts_with("main.") && hashed.len() == "main..js".len() + 8);
/// ```
pub fn render_filename(pattern: &str, name: &str, content: &[u8]) -> String {
    let mut filename = pattern.replace("[name]", name);
    if filename.contains("[hash]") || filename.contains("[contenthash]") {
        let hash = content_hash(content);
        filename = filename
            .replace("[contenthash]", &hash)
            .replace("[hash]", &hash);
    }
    filename
}

pub fn content_hash(content: &[u8]) -> String {
    let digest = blake3::hash(content).to_hex();
    digest.as_str()[..HASH_LENGTH].to_string()
}
