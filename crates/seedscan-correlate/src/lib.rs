//! Correlation engine for seedscan.
//!
//! Joins the download client's torrent file lists, the library managers'
//! tracked files, and the filesystem scan into per-path relationships,
//! hardlink groups, orphans, and cross-seed groups:
//!
//! - **`TrackingAggregator`** - folds all tracking claims into an immutable
//!   path → claims map
//! - **`RelationshipBuilder`** - one `FileRelationship` per path any source
//!   knows about
//! - **`OrphanDetector`** - main-classified files no source claims
//! - **`CrossSeedDetector`** - torrents sharing identical payload path sets
//! - **`ScanCoordinator`** - the fixed pipeline producing a `ScanReport`
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use seedscan_correlate::ScanCoordinator;
//!
//! let coordinator = ScanCoordinator::new(qbit, radarr, sonarr, config.paths);
//! let report = coordinator.run_full_scan().await?;
//! println!("{} orphans", report.statistics.orphaned_files);
//! ```

mod coordinator;
mod crossseed;
mod orphans;
mod relations;
mod tracking;

pub use coordinator::ScanCoordinator;
pub use crossseed::CrossSeedDetector;
pub use orphans::{LIBRARY_ORPHAN_REASON, OrphanDetector, TORRENT_ORPHAN_REASON};
pub use relations::RelationshipBuilder;
pub use tracking::{PathClaims, TrackingAggregator, TrackingMap};

// Re-export core types for convenience
pub use seedscan_core::{
    CrossSeedGroup, FileRelationship, HardlinkGroup, OrphanedFile, ScanError, ScanReport,
    ScanStatistics,
};
