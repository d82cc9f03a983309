//! Render session
//!
//! Owns the process-wide mutable state the pipeline needs: the settings,
//! the rendered-fragment cache, and a lazily built storage-client handle
//! keyed by its effective signing configuration. The handle is reused while
//! the configuration stays put and dropped wholesale when it changes; the
//! key comparison is repeated under the lock so concurrent renders never
//! build two clients for one configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use crate::cache::FragmentCache;
use crate::handler;
use crate::render::{error_fragment, EmbedAttrs};
use crate::settings::Settings;
use crate::storage::{credentials, S3Client, S3ClientConfig, StorageError};

struct CachedClient {
    key: String,
    store: Arc<S3Client>,
}

/// Injected context for render calls: settings + client handle + cache.
pub struct Session {
    settings: Settings,
    base_dir: PathBuf,
    cache: Mutex<FragmentCache>,
    client: Mutex<Option<CachedClient>>,
}

impl Session {
    /// Create a session. `base_dir` roots relative credentials paths.
    ///
    /// The fragment-cache TTL is clamped to the link timeout so a cached
    /// listing never serves links that have already expired.
    pub fn new(settings: Settings, base_dir: impl Into<PathBuf>) -> Self {
        let ttl = Duration::from_secs(settings.cache_ttl_secs)
            .min(settings.link_timeout_duration());
        Self {
            settings,
            base_dir: base_dir.into(),
            cache: Mutex::new(FragmentCache::new(ttl)),
            client: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings, dropping the client handle and the cache: a
    /// configuration change must never serve fragments signed under the old
    /// configuration.
    pub async fn update_settings(&mut self, settings: Settings) {
        info!("settings updated, dropping client handle");
        let ttl = Duration::from_secs(settings.cache_ttl_secs)
            .min(settings.link_timeout_duration());
        self.settings = settings;
        *self.client.lock().await = None;
        *self.cache.lock().await = FragmentCache::new(ttl);
    }

    /// Get the client handle for the effective signing configuration,
    /// rebuilding it when the configuration key differs from the cached one.
    pub async fn client_for(
        &self,
        region_override: Option<&str>,
    ) -> Result<Arc<S3Client>, StorageError> {
        let key = self.settings.signing_key(region_override);

        let mut guard = self.client.lock().await;
        // Re-check under the lock: another task may have rebuilt it already.
        if let Some(cached) = guard.as_ref() {
            if cached.key == key {
                return Ok(cached.store.clone());
            }
        }

        info!(key, "building storage client");
        let creds = credentials::resolve(
            &self.settings.credentials_profile,
            &self.settings.credentials_path,
            &self.base_dir,
        )?;
        let config = S3ClientConfig::for_region(
            self.settings.effective_region(region_override),
            creds.access_key_id,
            creds.secret_access_key,
        );
        let store = Arc::new(S3Client::new(config)?);
        *guard = Some(CachedClient {
            key,
            store: store.clone(),
        });
        Ok(store)
    }

    /// Render a single signed link for `raw`.
    pub async fn render_href(&self, raw: &str, attrs: &EmbedAttrs) -> String {
        match self.client_for(attrs.region.as_deref()).await {
            Ok(store) => {
                handler::render_link(store.as_ref(), &self.settings, &self.cache, raw, attrs).await
            }
            Err(e) => error_fragment(&format!("cannot sign link: {}", e)),
        }
    }

    /// Render a directory listing of signed links under `raw`.
    pub async fn render_dir(&self, raw: &str, attrs: &EmbedAttrs) -> String {
        match self.client_for(attrs.region.as_deref()).await {
            Ok(store) => {
                handler::render_listing(store.as_ref(), &self.settings, &self.cache, raw, attrs)
                    .await
            }
            Err(e) => error_fragment(&format!("cannot list: {}", e)),
        }
    }

    /// Render an audio player backed by a signed link for `raw`.
    pub async fn render_audio(&self, raw: &str, attrs: &EmbedAttrs) -> String {
        match self.client_for(attrs.region.as_deref()).await {
            Ok(store) => {
                handler::render_audio(store.as_ref(), &self.settings, &self.cache, raw, attrs)
                    .await
            }
            Err(e) => error_fragment(&format!("cannot sign link: {}", e)),
        }
    }
}
