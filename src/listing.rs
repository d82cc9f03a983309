//! Directory-listing filter
//!
//! Reduces a raw bucket listing to the entries worth showing: real objects
//! (non-zero size), excluding the titles object, exactly one path segment
//! below the requested prefix. Pure function, no I/O; output preserves
//! input order.

use crate::storage::ObjectEntry;

/// Filter a listing to the direct children of `key_prefix`.
///
/// Zero-size entries (directory placeholder markers) and the entry matching
/// `titles_key` are dropped. Depth is judged by removing the first occurrence
/// of the effective prefix from each key and checking for a remaining `/` —
/// not an anchored match. Keys containing the prefix substring elsewhere can
/// slip through; see [`filter_listing_anchored`] for the strict variant.
pub fn filter_listing(
    key_prefix: &str,
    listing: &[ObjectEntry],
    titles_key: Option<&str>,
) -> Vec<ObjectEntry> {
    let prefix = effective_prefix(key_prefix);
    listing
        .iter()
        .filter(|e| is_content(e, titles_key))
        .filter(|e| !e.key.replacen(&prefix, "", 1).contains('/'))
        .cloned()
        .collect()
}

/// Strict variant of [`filter_listing`]: the effective prefix must anchor at
/// the start of the key, and entries outside the prefix are dropped.
pub fn filter_listing_anchored(
    key_prefix: &str,
    listing: &[ObjectEntry],
    titles_key: Option<&str>,
) -> Vec<ObjectEntry> {
    let prefix = effective_prefix(key_prefix);
    listing
        .iter()
        .filter(|e| is_content(e, titles_key))
        .filter(|e| match e.key.strip_prefix(&prefix) {
            Some(rest) => !rest.contains('/'),
            None => false,
        })
        .cloned()
        .collect()
}

/// A non-empty prefix carries exactly one trailing `/`.
fn effective_prefix(key_prefix: &str) -> String {
    if !key_prefix.is_empty() && !key_prefix.ends_with('/') {
        format!("{}/", key_prefix)
    } else {
        key_prefix.to_string()
    }
}

fn is_content(entry: &ObjectEntry, titles_key: Option<&str>) -> bool {
    entry.size > 0 && titles_key != Some(entry.key.as_str())
}
