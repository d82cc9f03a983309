//! Storage capability layer
//!
//! Everything that talks to an object store goes through the [`ObjectStore`]
//! trait: one listing call, one object read, one presigning call. The render
//! pipeline only ever sees this seam, so tests can substitute a double and
//! the S3 wire details stay in one place.

pub mod credentials;
pub mod s3;
pub mod types;

pub use credentials::Credentials;
pub use s3::S3Client;
pub use types::{ObjectEntry, S3ClientConfig, StorageError};

use async_trait::async_trait;
use std::time::Duration;

/// Read-and-sign capability against an object-storage bucket.
///
/// Implementations must not retry: each call is a single attempt, and the
/// caller decides how a failure surfaces.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all objects under `prefix` in `bucket` (no delimiter; nested
    /// objects are included and filtered by the caller).
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectEntry>, StorageError>;

    /// Fetch the full body of one object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Produce a time-limited, read-only signed URL for one object.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
