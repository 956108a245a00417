//! Error types for FlowAtlas.
//!
//! Library crates use [`FlowAtlasError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all FlowAtlas operations.
#[derive(Debug, thiserror::Error)]
pub enum FlowAtlasError {
    /// Configuration loading or validation error (hosts file, app config).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network, HTTP status, or JSON decode failure reaching a host endpoint.
    /// Fatal to the enclosing host crawl when it hits the workflow list or a
    /// workflow detail; other hosts are unaffected.
    #[error("retrieval error for {url}: {message}")]
    Retrieval {
        url: String,
        /// HTTP status, when the response got far enough to carry one.
        status: Option<u16>,
        message: String,
    },

    /// A tool referenced by a workflow step could not be resolved.
    /// Recovered by discarding the one workflow that referenced it.
    #[error("tool resolution failed for '{tool_id}': {message}")]
    ToolResolution { tool_id: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (URL construction, serialization).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Static file server error (bind or serve failure).
    #[error("server error: {0}")]
    Server(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FlowAtlasError>;

impl FlowAtlasError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a retrieval error for a URL, with the HTTP status if one arrived.
    pub fn retrieval(url: impl Into<String>, status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Retrieval {
            url: url.into(),
            status,
            message: msg.into(),
        }
    }

    /// Create a tool resolution error for a tool id.
    pub fn tool_resolution(tool_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ToolResolution {
            tool_id: tool_id.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is a retrieval failure (list/detail fetch).
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval { .. })
    }
}
