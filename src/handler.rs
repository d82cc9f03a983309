//! Render pipeline
//!
//! Composes the parser, listing filter, title resolver and link signer into
//! the three embed operations: a single signed link, an audio player, and a
//! directory listing. Every operation is cached by request fingerprint; a
//! failed render returns an inline error fragment and is never cached.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{fingerprint, FragmentCache};
use crate::error::RenderError;
use crate::listing::{filter_listing, filter_listing_anchored};
use crate::reference::{parse_filename_from_key, Reference};
use crate::render::{
    build_anchor, build_audio, build_dir_listing, error_fragment, EmbedAttrs, SignedEntry,
};
use crate::settings::Settings;
use crate::storage::ObjectStore;
use crate::titles::fetch_titles;

/// Render an anchor fragment for one signed link.
///
/// A signing failure becomes a visible inline error fragment; it never
/// propagates out of the render.
pub async fn render_link(
    store: &dyn ObjectStore,
    settings: &Settings,
    cache: &Mutex<FragmentCache>,
    raw: &str,
    attrs: &EmbedAttrs,
) -> String {
    let fp = fingerprint("href", raw, attrs);
    if let Some(hit) = cache.lock().await.get(&fp) {
        return hit;
    }

    let reference = Reference::parse(raw);
    let title = attrs.title.clone().unwrap_or_else(|| reference.filename.clone());

    match sign_reference(store, &reference, settings.link_timeout_duration()).await {
        Ok(url) => {
            let fragment = build_anchor(&url, &title, attrs);
            cache.lock().await.put(fp, fragment.clone());
            fragment
        }
        Err(e) => {
            warn!("cannot render link {}: {}", raw, e);
            error_fragment(&e.to_string())
        }
    }
}

/// Render an audio-player fragment for one signed object.
pub async fn render_audio(
    store: &dyn ObjectStore,
    settings: &Settings,
    cache: &Mutex<FragmentCache>,
    raw: &str,
    attrs: &EmbedAttrs,
) -> String {
    let fp = fingerprint("audio", raw, attrs);
    if let Some(hit) = cache.lock().await.get(&fp) {
        return hit;
    }

    let reference = Reference::parse(raw);
    let title = attrs.title.clone().unwrap_or_else(|| reference.filename.clone());

    match sign_reference(store, &reference, settings.link_timeout_duration()).await {
        Ok(url) => {
            let fragment = build_audio(&url, &title, attrs);
            cache.lock().await.put(fp, fragment.clone());
            fragment
        }
        Err(e) => {
            warn!("cannot render audio {}: {}", raw, e);
            error_fragment(&e.to_string())
        }
    }
}

/// Render a directory listing of signed links under a key prefix.
///
/// Listing and signing failures abort this render with an inline error
/// fragment. A title-resolution failure does not: the listing falls back to
/// filename titles. Zero surviving entries yield a literal
/// `no listing for <reference>` message, which is cached like any success.
pub async fn render_listing(
    store: &dyn ObjectStore,
    settings: &Settings,
    cache: &Mutex<FragmentCache>,
    raw: &str,
    attrs: &EmbedAttrs,
) -> String {
    let fp = fingerprint("dir", raw, attrs);
    if let Some(hit) = cache.lock().await.get(&fp) {
        return hit;
    }

    match render_listing_uncached(store, settings, raw, attrs).await {
        Ok(fragment) => {
            cache.lock().await.put(fp, fragment.clone());
            fragment
        }
        Err(e) => {
            warn!("cannot list {}: {}", raw, e);
            error_fragment(&e.to_string())
        }
    }
}

async fn render_listing_uncached(
    store: &dyn ObjectStore,
    settings: &Settings,
    raw: &str,
    attrs: &EmbedAttrs,
) -> Result<String, RenderError> {
    let reference = Reference::parse(raw);
    debug!("list {}", raw);

    let titles_key = attrs
        .titles
        .as_ref()
        .map(|t| format!("{}/{}", reference.key, t));

    let listing = store
        .list_objects(&reference.bucket, &reference.key)
        .await
        .map_err(RenderError::Listing)?;

    let contents = if settings.strict_prefix {
        filter_listing_anchored(&reference.key, &listing, titles_key.as_deref())
    } else {
        filter_listing(&reference.key, &listing, titles_key.as_deref())
    };

    if contents.is_empty() {
        return Ok(format!("no listing for {}", raw));
    }

    let expiry = settings.link_timeout_duration();
    let mut entries = Vec::with_capacity(contents.len());
    for entry in &contents {
        let url = store
            .presign_get(&reference.bucket, &entry.key, expiry)
            .await
            .map_err(RenderError::Signing)?;
        entries.push(SignedEntry {
            name: parse_filename_from_key(&entry.key),
            url,
        });
    }

    let titles = match titles_key {
        Some(key) => match fetch_titles(store, &reference.bucket, &key).await {
            Ok(titles) => titles,
            Err(e) => {
                // Unreadable or malformed titles degrade to filenames.
                warn!("{}; using filenames for {}", e, raw);
                HashMap::new()
            }
        },
        None => HashMap::new(),
    };

    Ok(build_dir_listing(&entries, &titles, attrs))
}

async fn sign_reference(
    store: &dyn ObjectStore,
    reference: &Reference,
    expiry: Duration,
) -> Result<String, RenderError> {
    store
        .presign_get(&reference.bucket, &reference.key, expiry)
        .await
        .map_err(RenderError::Signing)
}
