//! Bucket/key reference parsing
//!
//! A reference is a user-supplied string of the form `[s3://]<bucket>/<key>`.
//! Parsing is purely lexical: it never touches the network and never fails.
//! Malformed input degrades to empty fields instead of returning an error,
//! so callers can always render *something*.

use serde::{Deserialize, Serialize};

/// A parsed bucket/key reference.
///
/// Immutable once parsed; all fields are derived from `raw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// The original reference string as supplied by the caller
    pub raw: String,
    /// Bucket name (empty if the reference is degenerate)
    pub bucket: String,
    /// Object key, never ending in `/`
    pub key: String,
    /// Last `/`-delimited segment of the reference (empty if none)
    pub filename: String,
}

impl Reference {
    /// Parse a reference string into its bucket, key and filename parts.
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            bucket: parse_bucket(raw),
            key: parse_key(raw),
            filename: parse_filename(raw),
        }
    }
}

/// Strip a leading `s3://` scheme marker, if present.
fn strip_scheme(request: &str) -> &str {
    request.strip_prefix("s3://").unwrap_or(request)
}

/// Extract the bucket from an href or directory listing request.
///
/// The bucket is everything up to the first `/` after the optional scheme
/// marker. A reference with no `/` is all bucket.
pub fn parse_bucket(request: &str) -> String {
    let rest = strip_scheme(request);
    match rest.find('/') {
        Some(idx) => rest[..idx].to_string(),
        None => rest.to_string(),
    }
}

/// Extract the key from an href or directory listing request.
///
/// The key is everything after the first `/` following the bucket, with
/// exactly one trailing `/` removed. A reference with no key yields `""`.
pub fn parse_key(request: &str) -> String {
    let rest = strip_scheme(request);
    match rest.find('/') {
        Some(idx) => {
            let key = &rest[idx + 1..];
            key.strip_suffix('/').unwrap_or(key).to_string()
        }
        None => String::new(),
    }
}

/// Extract the filename from an href request.
///
/// Returns the substring after the last `/`, or `""` when the request has no
/// path separator. Requests starting with the malformed marker `s://` are
/// routed through the `s3://` pattern, which cannot match them, so they
/// always yield `""` — a legacy quirk kept for compatibility with existing
/// embeds.
pub fn parse_filename(request: &str) -> String {
    if request.starts_with("s://") {
        match request.strip_prefix("s3://") {
            Some(rest) => rest
                .rfind('/')
                .map(|idx| rest[idx + 1..].to_string())
                .unwrap_or_default(),
            None => String::new(),
        }
    } else {
        request
            .rfind('/')
            .map(|idx| request[idx + 1..].to_string())
            .unwrap_or_default()
    }
}

/// Extract the filename from an object key.
///
/// Unlike [`parse_filename`], a key without any `/` is its own filename.
pub fn parse_filename_from_key(key: &str) -> String {
    key.rsplit('/').next().unwrap_or(key).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_with_s3_prefix() {
        assert_eq!(parse_bucket("s3://example.com/foo/bar/index.html"), "example.com");
    }

    #[test]
    fn test_parse_bucket_without_s3_prefix() {
        assert_eq!(parse_bucket("example.com/foo/bar/index.html"), "example.com");
    }

    #[test]
    fn test_parse_bucket_degenerate() {
        assert_eq!(parse_bucket(""), "");
        assert_eq!(parse_bucket("s3://"), "");
        assert_eq!(parse_bucket("bucket-only"), "bucket-only");
    }

    #[test]
    fn test_parse_key_with_s3_prefix() {
        assert_eq!(parse_key("s3://example.com/foo/bar/index.html"), "foo/bar/index.html");
    }

    #[test]
    fn test_parse_key_without_s3_prefix() {
        assert_eq!(parse_key("example.com/foo/bar/index.html"), "foo/bar/index.html");
    }

    #[test]
    fn test_parse_key_strips_one_trailing_slash() {
        assert_eq!(parse_key("s3://example.com/foo/bar/"), "foo/bar");
        assert_eq!(parse_key("b/foo/bar//"), "foo/bar/");
    }

    #[test]
    fn test_parse_key_without_key() {
        assert_eq!(parse_key("example.com"), "");
        assert_eq!(parse_key("s3://example.com"), "");
    }

    #[test]
    fn test_parse_filename() {
        assert_eq!(parse_filename("example.com/foo/bar/index.html"), "index.html");
    }

    #[test]
    fn test_parse_filename_without_file() {
        assert_eq!(parse_filename("example.com"), "");
    }

    #[test]
    fn test_parse_filename_without_file_with_s3() {
        // Malformed legacy marker: always degrades to empty.
        assert_eq!(parse_filename("s://example.com"), "");
        assert_eq!(parse_filename("s://example.com/foo/bar"), "");
    }

    #[test]
    fn test_parse_filename_no_separator_is_empty() {
        for r in ["", "bucket", "index.html", "no-separator-here"] {
            assert_eq!(parse_filename(r), "");
        }
    }

    #[test]
    fn test_parse_filename_from_key() {
        assert_eq!(parse_filename_from_key("foo/bar/index.html"), "index.html");
        assert_eq!(parse_filename_from_key("index.html"), "index.html");
        assert_eq!(parse_filename_from_key(""), "");
    }

    #[test]
    fn test_roundtrip_bucket_key() {
        let bucket = "my-bucket";
        let key = "foo/bar/baz.txt";
        let joined = format!("{}/{}", bucket, key);
        assert_eq!(parse_bucket(&joined), bucket);
        assert_eq!(parse_key(&joined), key);
    }

    #[test]
    fn test_reference_parse() {
        let r = Reference::parse("s3://abc/my_stuff/more_stuff/file.md");
        assert_eq!(r.bucket, "abc");
        assert_eq!(r.key, "my_stuff/more_stuff/file.md");
        assert_eq!(r.filename, "file.md");
        assert_eq!(r.raw, "s3://abc/my_stuff/more_stuff/file.md");
    }
}
