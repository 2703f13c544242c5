//! Core types and contracts for seedscan.
//!
//! This crate provides the value objects shared across the scan pipeline,
//! the application configuration, the error taxonomy, and the collaborator
//! traits the service clients implement.

mod config;
mod error;
mod provider;
mod record;

pub use config::{
    AppConfig, ConfigError, PathRemapper, PathsConfig, QbittorrentConfig, RadarrConfig,
    SonarrConfig,
};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use provider::{MediaProvider, ProviderError, TorrentProvider};
pub use record::{
    CrossSeedGroup, FileRecord, FileRelationship, FsIdentity, HardlinkGroup, MediaRecord,
    MediaService, OrphanLocation, OrphanedFile, RootKind, ScanReport, ScanStatistics,
    TorrentFileRef, TorrentRecord, link_count,
};
