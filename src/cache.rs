//! Rendered-fragment cache
//!
//! Memoizes the final HTML fragment for a request fingerprint so repeated
//! renders of the same embed skip the listing, signing and title-fetch work
//! entirely for a bounded window. The cache holds rendered output only —
//! never object bytes — and a hit serves URLs whose remaining validity is
//! whatever is left of the signed-URL expiry. Keep the cache TTL at or below
//! the link timeout so a cached listing never outlives its links.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default entry lifetime: 300 seconds.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// TTL-bounded fingerprint-to-fragment store.
///
/// Expiry is measured from insertion; expired entries are evicted lazily on
/// the next lookup and replaced on the next `put` for the same fingerprint.
pub struct FragmentCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl FragmentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Look up a fragment; an expired entry behaves exactly like a miss.
    pub fn get(&mut self, fingerprint: &str) -> Option<String> {
        match self.entries.get(fingerprint) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(fingerprint);
                None
            }
            None => None,
        }
    }

    /// Insert or replace the fragment for a fingerprint.
    pub fn put(&mut self, fingerprint: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(
            fingerprint.into(),
            CacheEntry {
                value: value.into(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for FragmentCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Compute the request fingerprint: a stable SHA-256 over the operation
/// name, the raw reference and the full attribute set. The attribute struct
/// has a fixed field order, so identical requests always collide and
/// distinct attribute sets never do.
pub fn fingerprint<A: Serialize>(operation: &str, reference: &str, attrs: &A) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update([0u8]);
    hasher.update(reference.as_bytes());
    hasher.update([0u8]);
    if let Ok(json) = serde_json::to_vec(attrs) {
        hasher.update(&json);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::EmbedAttrs;

    #[test]
    fn test_get_returns_fresh_entry() {
        let mut cache = FragmentCache::new(Duration::from_secs(60));
        cache.put("fp", "<a>hit</a>");
        assert_eq!(cache.get("fp").as_deref(), Some("<a>hit</a>"));
    }

    #[test]
    fn test_expired_entry_is_a_miss_and_evicted() {
        let mut cache = FragmentCache::new(Duration::from_secs(0));
        cache.put("fp", "stale");
        assert_eq!(cache.get("fp"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_put_replaces_existing_entry() {
        let mut cache = FragmentCache::new(Duration::from_secs(60));
        cache.put("fp", "old");
        cache.put("fp", "new");
        assert_eq!(cache.get("fp").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinguishes() {
        let attrs = EmbedAttrs::default();
        let a = fingerprint("href", "b/k", &attrs);
        let b = fingerprint("href", "b/k", &attrs);
        assert_eq!(a, b);

        assert_ne!(fingerprint("dir", "b/k", &attrs), a);
        assert_ne!(fingerprint("href", "b/other", &attrs), a);

        let mut titled = EmbedAttrs::default();
        titled.title = Some("T".to_string());
        assert_ne!(fingerprint("href", "b/k", &titled), a);
    }
}
