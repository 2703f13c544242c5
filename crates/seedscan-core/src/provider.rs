//! Collaborator contracts for the data sources the scan consumes.
//!
//! The pipeline never talks to the wire itself; it consumes already-decoded
//! records through these traits. An empty list is a valid result and is
//! distinct from a failed fetch.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{MediaRecord, MediaService, TorrentRecord};

/// Failures a collaborator fetch can produce.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The service could not be reached at all.
    #[error("{service} unreachable: {message}")]
    Connection {
        service: &'static str,
        message: String,
    },

    /// The service responded, but the response could not be used.
    #[error("{service} API error: {message}")]
    Api {
        service: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Which service failed.
    pub fn service(&self) -> &'static str {
        match self {
            ProviderError::Connection { service, .. } | ProviderError::Api { service, .. } => {
                service
            }
        }
    }
}

/// Source of torrent records (the download client).
#[async_trait]
pub trait TorrentProvider: Send + Sync {
    /// Fetch all torrents with their payload file lists.
    async fn torrents(&self) -> Result<Vec<TorrentRecord>, ProviderError>;
}

/// Source of media records (a library manager).
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Which service this provider speaks for.
    fn service(&self) -> MediaService;

    /// Fetch all tracked items.
    async fn items(&self) -> Result<Vec<MediaRecord>, ProviderError>;

    /// Enumerate the on-disk files of one item.
    ///
    /// Used for items without a single `file_path` (series). A failure here
    /// is degradable: the caller logs it and treats the item as
    /// contributing no paths.
    async fn item_files(&self, item: &MediaRecord) -> Result<Vec<PathBuf>, ProviderError>;
}
