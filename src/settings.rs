//! Persisted settings
//!
//! A flat key-value settings object with the recognized keys of the embed
//! host's configuration surface. Stored as JSON; unknown or missing keys
//! fall back to defaults so an older settings file keeps loading. Changing
//! settings must invalidate the cached storage-client handle — see
//! `Session::update_settings`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Process-wide configuration with per-key defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Path to an AWS credentials file; empty means `~/.aws/credentials`.
    /// Relative paths are resolved against the session's base directory.
    #[serde(default)]
    pub credentials_path: String,
    /// Credentials profile name
    #[serde(default = "default_profile")]
    pub credentials_profile: String,
    /// Default signing region
    #[serde(default = "default_region")]
    pub region: String,
    /// Storage API version pin
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Signed-URL lifetime as a duration string, e.g. "+60 minutes"
    #[serde(default = "default_link_timeout")]
    pub link_timeout: String,
    /// Use anchored prefix matching when filtering listings
    #[serde(default)]
    pub strict_prefix: bool,
    /// Rendered-fragment cache TTL in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_region() -> String {
    "us-east-2".to_string()
}

fn default_api_version() -> String {
    "latest".to_string()
}

fn default_link_timeout() -> String {
    "+60 minutes".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials_path: String::new(),
            credentials_profile: default_profile(),
            region: default_region(),
            api_version: default_api_version(),
            link_timeout: default_link_timeout(),
            strict_prefix: false,
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing or unreadable files yield
    /// the defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %path.display(), "malformed settings file, using defaults: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// The signed-URL lifetime; unparseable configuration falls back to the
    /// 60-minute default.
    pub fn link_timeout_duration(&self) -> Duration {
        parse_link_timeout(&self.link_timeout).unwrap_or(Duration::from_secs(3600))
    }

    /// The region in effect after an optional per-request override.
    pub fn effective_region(&self, region_override: Option<&str>) -> String {
        region_override.unwrap_or(&self.region).to_string()
    }

    /// Identity of the client handle this configuration requires. The
    /// cached handle is dropped wholesale whenever this changes.
    pub fn signing_key(&self, region_override: Option<&str>) -> String {
        format!(
            "{}|{}|{}",
            self.effective_region(region_override),
            self.credentials_profile,
            self.credentials_path
        )
    }
}

/// Parse a human-readable duration like "+60 minutes", "2 hours" or
/// "90 seconds". Returns None when the string does not look like a duration.
pub fn parse_link_timeout(value: &str) -> Option<Duration> {
    let value = value.trim().trim_start_matches('+').trim();
    let mut parts = value.split_whitespace();
    let count: u64 = parts.next()?.parse().ok()?;
    let unit = parts.next().unwrap_or("seconds");
    if parts.next().is_some() {
        return None;
    }

    let unit_secs = match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hour" | "hours" => 3600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        _ => return None,
    };

    count.checked_mul(unit_secs).map(Duration::from_secs)
}
