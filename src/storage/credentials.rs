//! AWS credentials-file resolution
//!
//! Reads `aws_access_key_id` / `aws_secret_access_key` for a named profile
//! from an INI-style credentials file. A relative `credentials_path` is
//! resolved against a caller-supplied base directory; an empty path falls
//! back to the conventional `~/.aws/credentials` location.

use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::StorageError;

/// A resolved access-key pair. `SecretString`'s `Debug` output is redacted.
#[derive(Debug)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

/// Resolve credentials for `profile` from `credentials_path` (which may be
/// empty or relative), rooting relative paths at `base_dir`.
pub fn resolve(
    profile: &str,
    credentials_path: &str,
    base_dir: &Path,
) -> Result<Credentials, StorageError> {
    let path = resolve_path(credentials_path, base_dir).ok_or_else(|| {
        StorageError::AuthenticationFailed("no credentials file location available".to_string())
    })?;

    debug!(profile, path = %path.display(), "reading credentials");

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        StorageError::AuthenticationFailed(format!(
            "cannot read credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    from_ini(&contents, profile)
}

/// Compute the effective credentials-file path.
fn resolve_path(credentials_path: &str, base_dir: &Path) -> Option<PathBuf> {
    if credentials_path.is_empty() {
        return dirs::home_dir().map(|h| h.join(".aws").join("credentials"));
    }
    let path = Path::new(credentials_path);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(base_dir.join(path))
    }
}

/// Parse the INI body of a credentials file for one profile section.
fn from_ini(contents: &str, profile: &str) -> Result<Credentials, StorageError> {
    let mut in_profile = false;
    let mut access_key_id: Option<String> = None;
    let mut secret_access_key: Option<String> = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            match k.trim().to_ascii_lowercase().as_str() {
                "aws_access_key_id" => access_key_id = Some(v.trim().to_string()),
                "aws_secret_access_key" => secret_access_key = Some(v.trim().to_string()),
                _ => {}
            }
        }
    }

    match (access_key_id, secret_access_key) {
        (Some(id), Some(secret)) => Ok(Credentials {
            access_key_id: id,
            secret_access_key: SecretString::from(secret),
        }),
        _ => Err(StorageError::AuthenticationFailed(format!(
            "profile '{}' has no complete key pair",
            profile
        ))),
    }
}
