//! Error types for the wikilite shell.
//!
//! Every failure the shell can observe is a variant here. Most of them are
//! recovered where they happen (logged, then degraded); only
//! [`WikiliteError::DatabaseNotFound`] changes the control flow of the caller,
//! handing over to the provisioning flow.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the wikilite shell.
#[derive(Debug, Error)]
pub enum WikiliteError {
    // Database discovery
    #[error("No content database found (searched {} locations)", searched.len())]
    DatabaseNotFound {
        /// Candidate files that were probed, in priority order.
        searched: Vec<PathBuf>,
    },

    #[error("Invalid database path {path}: {reason}")]
    InvalidDatabasePath { path: PathBuf, reason: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    // Engine process errors
    #[error("Failed to launch {binary}: {message}")]
    LaunchFailed { binary: PathBuf, message: String },

    // Client errors
    #[error("Search in mode {mode} failed: {message}")]
    SearchMode { mode: String, message: String },

    #[error("Failed to fetch article {id}: {message}")]
    ArticleFetch { id: u64, message: String },

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("No search mode selected")]
    NoModesSelected,

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for wikilite operations.
pub type Result<T> = std::result::Result<T, WikiliteError>;

impl From<std::io::Error> for WikiliteError {
    fn from(err: std::io::Error) -> Self {
        WikiliteError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for WikiliteError {
    fn from(err: serde_json::Error) -> Self {
        WikiliteError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for WikiliteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WikiliteError::Timeout(std::time::Duration::from_secs(0))
        } else {
            WikiliteError::Network {
                message: err.to_string(),
                cause: std::error::Error::source(&err).map(|s| s.to_string()),
            }
        }
    }
}

impl WikiliteError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        WikiliteError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Whether the error is handled by degrading and logging.
    ///
    /// `DatabaseNotFound` is the only error that redirects control to the
    /// provisioning flow; configuration errors stop startup before anything
    /// is spawned.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            WikiliteError::DatabaseNotFound { .. } | WikiliteError::Config { .. }
        )
    }

    /// Whether the error means the database has to be provisioned.
    pub fn needs_provisioning(&self) -> bool {
        matches!(self, WikiliteError::DatabaseNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WikiliteError::ArticleFetch {
            id: 42,
            message: "status error".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch article 42: status error");

        let err = WikiliteError::DatabaseNotFound {
            searched: vec![PathBuf::from("/a/wikilite.db"), PathBuf::from("/b/wikilite.db")],
        };
        assert_eq!(
            err.to_string(),
            "No content database found (searched 2 locations)"
        );
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(WikiliteError::SearchMode {
            mode: "title".into(),
            message: "boom".into()
        }
        .is_recoverable());
        assert!(WikiliteError::Timeout(std::time::Duration::from_secs(5)).is_recoverable());

        let missing = WikiliteError::DatabaseNotFound { searched: vec![] };
        assert!(!missing.is_recoverable());
        assert!(missing.needs_provisioning());
    }

    #[test]
    fn test_io_with_path_keeps_path() {
        let err = WikiliteError::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/tmp/x",
        );
        match err {
            WikiliteError::Io { path, .. } => assert_eq!(path, Some(PathBuf::from("/tmp/x"))),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
