//! Error types for debrisscan.
//!
//! Library crates use [`DebrisError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Classification of a single failed network attempt.
///
/// All three kinds are retried identically by the fetcher; the distinction
/// only matters for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection-level failure (DNS, TLS, reset, malformed response).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status code.
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// The attempt exceeded the per-request timeout.
    #[error("timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Top-level error type for all debrisscan operations.
#[derive(Debug, thiserror::Error)]
pub enum DebrisError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network failure after the fetcher exhausted its retry budget.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Expected structure absent from a fetched document (no coordinates
    /// in the title, no fleet links on the map).
    #[error("structure error: {message}")]
    Structure { message: String },

    /// The supplied debris page lacks required fixtures.
    #[error("environment error: missing page elements: {missing}")]
    Environment { missing: String },

    /// Numeric or URL parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The crawl was cancelled before completing.
    #[error("analysis cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DebrisError>;

impl DebrisError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a structure error from any displayable message.
    pub fn structure(msg: impl Into<String>) -> Self {
        Self::Structure {
            message: msg.into(),
        }
    }

    /// Create an environment error naming the missing selectors.
    pub fn environment(missing: impl Into<String>) -> Self {
        Self::Environment {
            missing: missing.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Wrap an exhausted fetch with the URL it was aimed at.
    pub fn network(url: impl Into<String>, source: FetchError) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
