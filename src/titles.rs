//! Title-map resolution
//!
//! A listing may name a sidecar JSON object mapping filenames to
//! human-readable titles. Resolution performs exactly one object read per
//! render; any failure (missing object, bad UTF-8, not a flat JSON object)
//! is a [`RenderError::TitleFetch`], which callers recover from by showing
//! filenames instead.

use std::collections::HashMap;
use tracing::debug;

use crate::error::RenderError;
use crate::storage::{ObjectStore, StorageError};

/// Fetch and decode the filename-to-title mapping at `(bucket, key)`.
pub async fn fetch_titles(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<HashMap<String, String>, RenderError> {
    debug!(bucket, key, "fetching titles");

    let body = store
        .get_object(bucket, key)
        .await
        .map_err(RenderError::TitleFetch)?;

    let text = String::from_utf8(body)
        .map_err(|e| RenderError::TitleFetch(StorageError::ParseError(e.to_string())))?;

    serde_json::from_str::<HashMap<String, String>>(&text)
        .map_err(|e| RenderError::TitleFetch(StorageError::ParseError(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectEntry;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedStore {
        body: Option<Vec<u8>>,
    }

    #[async_trait]
    impl ObjectStore for FixedStore {
        async fn list_objects(
            &self,
            _bucket: &str,
            _prefix: &str,
        ) -> Result<Vec<ObjectEntry>, StorageError> {
            Ok(Vec::new())
        }

        async fn get_object(&self, _bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
            self.body
                .clone()
                .ok_or_else(|| StorageError::NotFound(key.to_string()))
        }

        async fn presign_get(
            &self,
            _bucket: &str,
            _key: &str,
            _expires_in: Duration,
        ) -> Result<String, StorageError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_fetch_titles_decodes_mapping() {
        let store = FixedStore {
            body: Some(br#"{"program_notes.pdf": "The Program"}"#.to_vec()),
        };
        let titles = fetch_titles(&store, "b", "dir/titles.json").await.expect("titles");
        assert_eq!(titles.get("program_notes.pdf").map(String::as_str), Some("The Program"));
    }

    #[tokio::test]
    async fn test_fetch_titles_missing_object() {
        let store = FixedStore { body: None };
        let err = fetch_titles(&store, "b", "dir/titles.json").await.unwrap_err();
        assert!(matches!(err, RenderError::TitleFetch(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_titles_malformed_json() {
        let store = FixedStore {
            body: Some(b"not json at all".to_vec()),
        };
        let err = fetch_titles(&store, "b", "t.json").await.unwrap_err();
        assert!(matches!(err, RenderError::TitleFetch(StorageError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_fetch_titles_rejects_non_object() {
        let store = FixedStore {
            body: Some(b"[1, 2, 3]".to_vec()),
        };
        assert!(fetch_titles(&store, "b", "t.json").await.is_err());
    }
}
