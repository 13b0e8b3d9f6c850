//! Error types for the docsync CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (4=registry, 5=partial, 6=remote, 7=config, 8=io)
//! - Context-aware recovery hints
//! - Structured JSON output for `--json` consumers
//!
//! Per-resource upload and delete failures are NOT errors at this level:
//! they are recorded on the affected entry and reported in the batch
//! result. Commands turn a batch with failures into [`Error::PartialFailure`]
//! once the results are saved and printed. Only conditions that make a whole operation meaningless
//! (missing config, a broken registry file, an unreachable remote
//! baseline) surface as [`Error`].

use std::path::PathBuf;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for docsync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Registry structure (exit 4)
    UnknownVersion,
    InvalidRegistry,
    InvalidArgument,

    // Some remote operations failed (exit 5)
    PartialFailure,

    // Remote (exit 6)
    TransportError,
    AuthError,

    // Config (exit 7)
    NotInitialized,
    AlreadyInitialized,
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::UnknownVersion => "UNKNOWN_VERSION",
            Self::InvalidRegistry => "INVALID_REGISTRY",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::PartialFailure => "PARTIAL_FAILURE",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::AuthError => "AUTH_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::UnknownVersion | Self::InvalidRegistry | Self::InvalidArgument => 4,
            Self::PartialFailure => 5,
            Self::TransportError | Self::AuthError => 6,
            Self::NotInitialized | Self::AlreadyInitialized | Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether re-running the same command may succeed.
    ///
    /// Remote failures are transient; a fresh run re-decides create vs
    /// update from a new diff, so retrying is always safe.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError | Self::PartialFailure)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in docsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: no config at {path}")]
    NotInitialized { path: PathBuf },

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Unknown version '{version}' in project '{project}'")]
    UnknownVersion { project: String, version: String },

    #[error("Invalid registry: {0}")]
    InvalidRegistry(String),

    #[error("{failed} of {total} remote operations failed")]
    PartialFailure { failed: usize, total: usize },

    #[error("Remote request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized { .. } => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::UnknownVersion { .. } => ErrorCode::UnknownVersion,
            Self::InvalidRegistry(_) => ErrorCode::InvalidRegistry,
            Self::PartialFailure { .. } => ErrorCode::PartialFailure,
            Self::Transport(_) => ErrorCode::TransportError,
            Self::Auth(_) => ErrorCode::AuthError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized { .. } => Some(
                "Create one with: docsync config --staging <slug> --production <slug>".to_string(),
            ),

            Self::AlreadyInitialized { path } => Some(format!(
                "A registry already exists at {}. Use `--force` to overwrite it.",
                path.display()
            )),

            Self::UnknownVersion { .. } | Self::InvalidRegistry(_) => Some(
                "The local registry does not match its expected shape. \
                 Re-run `docsync init` or fix syncRegistry.json by hand."
                    .to_string(),
            ),

            Self::Transport(TransportError::Http { status: 401 | 403, .. }) | Self::Auth(_) => {
                Some(
                    "Set DOCSYNC_API_KEY (or DOCSYNC_SESSION_COOKIE), \
                     or write ~/.docsync/credentials.json"
                        .to_string(),
                )
            }

            Self::PartialFailure { .. } => Some(
                "Failed resources are listed above; re-run the command to retry them.".to_string(),
            ),

            Self::Transport(_) => {
                Some("Re-run the command; create vs update is re-decided each run.".to_string())
            }

            Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        let err = Error::UnknownVersion {
            project: "docs".into(),
            version: "v9".into(),
        };
        assert_eq!(err.exit_code(), 4);

        let err = Error::Transport(TransportError::Network("reset".into()));
        assert_eq!(err.exit_code(), 6);
        assert!(err.error_code().is_retryable());

        let err = Error::Config("bad".into());
        assert_eq!(err.exit_code(), 7);
        assert!(!err.error_code().is_retryable());

        let err = Error::PartialFailure { failed: 1, total: 9 };
        assert_eq!(err.exit_code(), 5);
        assert_eq!(err.to_string(), "1 of 9 remote operations failed");
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::NotInitialized {
            path: PathBuf::from("syncConfig.json"),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "NOT_INITIALIZED");
        assert_eq!(json["error"]["exit_code"], 7);
        assert!(json["error"]["hint"].as_str().unwrap().contains("docsync config"));
    }

    #[test]
    fn test_unauthorized_gets_credentials_hint() {
        let err = Error::Transport(TransportError::Http {
            status: 401,
            body: "nope".into(),
        });
        assert!(err.hint().unwrap().contains("DOCSYNC_API_KEY"));
    }
}
