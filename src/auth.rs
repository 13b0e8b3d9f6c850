//! Credentials for the documentation host.
//!
//! Resolution order:
//! 1. `DOCSYNC_API_KEY` environment variable
//! 2. `DOCSYNC_SESSION_COOKIE` environment variable
//! 3. `~/.docsync/credentials.json` (`{"api_key": ...}` or `{"session_cookie": ...}`)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const API_KEY_ENV: &str = "DOCSYNC_API_KEY";
pub const SESSION_COOKIE_ENV: &str = "DOCSYNC_SESSION_COOKIE";

/// How requests to the host are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Sent as the basic-auth user with an empty password.
    ApiKey(String),
    /// Sent verbatim as the `Cookie` header.
    Session(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Session(_) => f.write_str("Session(***)"),
        }
    }
}

/// On-disk credentials file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

/// Path of the credentials file in the user's home directory.
#[must_use]
pub fn credentials_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".docsync").join("credentials.json"))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve credentials from the environment, then the credentials file.
///
/// # Errors
///
/// Returns [`Error::Auth`] if no credential is configured anywhere.
pub fn resolve() -> Result<Credential> {
    resolve_from(
        non_empty_env(API_KEY_ENV),
        non_empty_env(SESSION_COOKIE_ENV),
        credentials_path().as_deref(),
    )
}

/// Resolve from explicit sources. Environment values win over the file.
///
/// # Errors
///
/// Returns [`Error::Auth`] if nothing usable is found, or if the file
/// exists but cannot be parsed.
pub fn resolve_from(
    api_key: Option<String>,
    session_cookie: Option<String>,
    file: Option<&Path>,
) -> Result<Credential> {
    if let Some(key) = api_key {
        debug!(source = API_KEY_ENV, "Using API key");
        return Ok(Credential::ApiKey(key));
    }
    if let Some(cookie) = session_cookie {
        debug!(source = SESSION_COOKIE_ENV, "Using session cookie");
        return Ok(Credential::Session(cookie));
    }

    let Some(path) = file.filter(|p| p.exists()) else {
        return Err(Error::Auth(format!(
            "no credentials found (set {API_KEY_ENV} or {SESSION_COOKIE_ENV})"
        )));
    };

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Auth(format!("Failed to read {}: {e}", path.display())))?;
    let stored: StoredCredentials = serde_json::from_str(&content)
        .map_err(|e| Error::Auth(format!("Failed to parse {}: {e}", path.display())))?;

    debug!(path = %path.display(), "Using stored credentials");
    match stored {
        StoredCredentials {
            api_key: Some(key), ..
        } if !key.is_empty() => Ok(Credential::ApiKey(key)),
        StoredCredentials {
            session_cookie: Some(cookie),
            ..
        } if !cookie.is_empty() => Ok(Credential::Session(cookie)),
        _ => Err(Error::Auth(format!(
            "{} holds neither api_key nor session_cookie",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_key_wins() {
        let cred = resolve_from(Some("key".into()), Some("c=1".into()), None).unwrap();
        assert_eq!(cred, Credential::ApiKey("key".into()));
    }

    #[test]
    fn test_cookie_when_no_key() {
        let cred = resolve_from(None, Some("c=1".into()), None).unwrap();
        assert_eq!(cred, Credential::Session("c=1".into()));
    }

    #[test]
    fn test_file_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        fs::write(&path, r#"{"session_cookie": "connect.sid=abc"}"#).unwrap();

        let cred = resolve_from(None, None, Some(&path)).unwrap();
        assert_eq!(cred, Credential::Session("connect.sid=abc".into()));
    }

    #[test]
    fn test_missing_everything_is_auth_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");
        let err = resolve_from(None, None, Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_empty_file_is_auth_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        fs::write(&path, "{}").unwrap();
        assert!(resolve_from(None, None, Some(&path)).is_err());
    }

    #[test]
    fn test_debug_redacts() {
        let shown = format!("{:?}", Credential::ApiKey("secret".into()));
        assert!(!shown.contains("secret"));
    }
}
