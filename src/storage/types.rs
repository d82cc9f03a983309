//! Shared types for the storage layer
//!
//! Object-listing entries, S3 client configuration and the storage error
//! type used across the capability seam.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One item returned by an object-listing call.
///
/// Read-only view of a storage result; zero-size entries are directory
/// placeholder markers in the bucket namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key
    pub key: String,
    /// Object size in bytes (0 for directory markers)
    pub size: u64,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self { key: key.into(), size }
    }
}

/// S3 client configuration, resolved per effective signing config.
#[derive(Debug, Clone)]
pub struct S3ClientConfig {
    /// AWS region (e.g., us-east-2)
    pub region: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key (SecretString for memory zeroization)
    pub secret_access_key: SecretString,
    /// S3-compatible endpoint URL (None for AWS S3)
    pub endpoint: Option<String>,
    /// Use path-style addressing (for MinIO, etc.)
    pub path_style: bool,
    /// Network timeout for storage calls, in seconds
    pub timeout_secs: u64,
}

impl S3ClientConfig {
    /// Plain AWS configuration for a region and key pair.
    pub fn for_region(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: SecretString,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key,
            endpoint: None,
            path_style: false,
            timeout_secs: 30,
        }
    }
}

/// Storage error type
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_entry_new() {
        let e = ObjectEntry::new("some/dir/file.txt", 128);
        assert_eq!(e.key, "some/dir/file.txt");
        assert_eq!(e.size, 128);
    }

    #[test]
    fn test_storage_error_display() {
        let e = StorageError::AuthenticationFailed("bad keys".into());
        assert_eq!(e.to_string(), "Authentication failed: bad keys");
    }
}
