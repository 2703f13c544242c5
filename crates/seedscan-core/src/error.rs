//! Error taxonomy for scan runs.
//!
//! Fatal conditions are `ScanError` variants and abort the scan with no
//! partial result. Degraded conditions become `ScanWarning` values collected
//! into the report; the scan completes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::ProviderError;

/// Fatal errors that abort a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A collaborator could not be fetched from.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A configured root exists but its top level cannot be opened.
    #[error("root is not readable: {path}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan was cancelled between pipeline stages.
    #[error("scan cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an opaque internal error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Kind of non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A walk entry could not be read.
    Read,
    /// A file's metadata could not be read.
    Metadata,
    /// A per-item file enumeration call failed.
    Enumeration,
}

/// Non-fatal condition encountered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path the condition occurred at.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of condition.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Warning for an unreadable walk entry.
    pub fn read_error(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::new(path, format!("read error: {message}"), WarningKind::Read)
    }

    /// Warning for unreadable file metadata.
    pub fn metadata_error(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::new(
            path,
            format!("metadata error: {message}"),
            WarningKind::Metadata,
        )
    }
}
