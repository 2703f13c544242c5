//! Value objects shared across the scan pipeline.
//!
//! Everything here is constructed fresh for a single scan run; there is no
//! cross-scan identity or caching.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;

/// Filesystem identity of a file's data: device id plus inode number.
///
/// Hardlink detection keys on the full pair. Inode numbers are only unique
/// within one device, so two unrelated files on different volumes may share
/// an inode number and must never be treated as linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FsIdentity {
    /// Device id the file lives on.
    pub device: u64,
    /// Inode number within that device.
    pub inode: u64,
}

impl FsIdentity {
    /// Create an identity from raw ids.
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }

    /// Read the identity out of file metadata.
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        Self {
            device: get_dev(metadata),
            inode: get_ino(metadata),
        }
    }
}

// Cross-platform metadata accessors

#[cfg(unix)]
fn get_dev(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.dev()
}

#[cfg(not(unix))]
fn get_dev(_metadata: &std::fs::Metadata) -> u64 {
    0
}

#[cfg(unix)]
fn get_ino(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ino()
}

#[cfg(not(unix))]
fn get_ino(_metadata: &std::fs::Metadata) -> u64 {
    0
}

/// Number of directory entries pointing at the file's inode.
#[cfg(unix)]
pub fn link_count(metadata: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.nlink()
}

#[cfg(not(unix))]
pub fn link_count(_metadata: &std::fs::Metadata) -> u64 {
    1
}

/// Which root category a file was discovered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKind {
    /// Download-client save paths.
    Torrent,
    /// Media-library paths managed by Radarr/Sonarr.
    Library,
}

/// A single regular file seen by the filesystem walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Device-qualified inode identity.
    pub identity: FsIdentity,
    /// Hardlink count reported by the filesystem.
    pub link_count: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// A set of paths sharing one filesystem identity.
///
/// Members share byte-identical content and size (same inode). Groups are
/// only reported with two or more members; a lone path is not a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardlinkGroup {
    /// The shared identity.
    pub identity: FsIdentity,
    /// Member paths, sorted.
    pub files: Vec<PathBuf>,
    /// Size of the shared data in bytes (counted once on disk).
    pub file_size: u64,
    /// Number of members, equals `files.len()`.
    pub link_count: u64,
}

impl HardlinkGroup {
    /// Space the group would occupy if its members were independent copies.
    pub fn apparent_size(&self) -> u64 {
        self.file_size * self.files.len() as u64
    }
}

/// One file inside a torrent's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFileRef {
    /// Host-filesystem path of the payload file.
    pub path: PathBuf,
    /// Size in bytes as reported by the client.
    pub size: u64,
}

/// A torrent as reported by the download client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Info-hash identifying the torrent.
    pub id: CompactString,
    /// Display name.
    pub name: CompactString,
    /// Client-side category, empty when uncategorized.
    pub category: CompactString,
    /// Directory the payload is saved under.
    pub save_path: PathBuf,
    /// Client state string (e.g. `uploading`, `pausedUP`).
    pub state: CompactString,
    /// When the torrent was added to the client.
    pub added_at: DateTime<Utc>,
    /// First real (non-DHT/PeX pseudo-entry) tracker URL, if any.
    pub primary_tracker: Option<CompactString>,
    /// Payload file list.
    pub files: Vec<TorrentFileRef>,
}

impl TorrentRecord {
    /// Total payload size in bytes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Which library manager tracks an item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaService {
    /// Movie manager; tracks one file per item.
    Radarr,
    /// Series manager; tracks a folder per item, files enumerated separately.
    Sonarr,
}

impl MediaService {
    /// Lowercase service name as used in logs and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaService::Radarr => "radarr",
            MediaService::Sonarr => "sonarr",
        }
    }
}

impl std::fmt::Display for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media item as reported by Radarr or Sonarr.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Service-local numeric id.
    pub id: i64,
    /// Item title.
    pub title: CompactString,
    /// Which service reported the item.
    pub service: MediaService,
    /// Tracked file path. Absent for multi-file items (series), whose files
    /// come from the per-item enumeration call instead.
    pub file_path: Option<PathBuf>,
    /// Item folder on disk.
    pub folder_path: PathBuf,
    /// Whether the service is monitoring the item.
    pub monitored: bool,
    /// Whether the service believes the item has at least one file.
    pub has_file: bool,
}

/// Everything known about one path after all sources are folded together.
///
/// One relationship exists per distinct path seen by any source. A path that
/// is tracked but no longer on disk keeps `identity: None` and an empty
/// sibling list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRelationship {
    /// The path this relationship describes.
    pub file_path: PathBuf,
    /// Size in bytes; for paths missing from disk, the tracking source's
    /// reported size, or zero when no source reported one.
    pub size: u64,
    /// Filesystem identity, absent when the path was not found on disk.
    pub identity: Option<FsIdentity>,
    /// Hardlink count from the filesystem, zero when not on disk.
    pub link_count: u64,
    /// Other paths sharing this path's identity (self excluded).
    pub hardlinked_files: Vec<PathBuf>,
    /// Info-hashes of torrents whose payload includes this path.
    pub torrent_refs: BTreeSet<CompactString>,
    /// Library services tracking this path.
    pub service_refs: BTreeSet<MediaService>,
}

impl FileRelationship {
    /// Whether any source at all claims this path.
    pub fn is_tracked(&self) -> bool {
        !self.torrent_refs.is_empty() || !self.service_refs.is_empty()
    }

    /// Whether the path was present in the filesystem scan.
    pub fn on_disk(&self) -> bool {
        self.identity.is_some()
    }
}

/// Root category an orphan was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanLocation {
    TorrentRoot,
    LibraryRoot,
}

/// A main-content file on disk that no tracking source claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanedFile {
    /// Path of the unclaimed file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Which root category it was found under.
    pub location: OrphanLocation,
    /// Which tracking sources failed to claim it.
    pub reason: String,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// Torrents whose payload path sets are identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossSeedGroup {
    /// The shared payload paths, sorted.
    pub files: Vec<PathBuf>,
    /// The torrents seeding those paths.
    pub torrents: Vec<TorrentRecord>,
    /// Distinct tracker URLs across the group.
    pub trackers: BTreeSet<CompactString>,
    /// Payload size of one representative torrent (the payloads are the
    /// same files, so any member's total applies).
    pub total_size: u64,
}

impl CrossSeedGroup {
    /// Number of torrents sharing the payload.
    pub fn torrent_count(&self) -> usize {
        self.torrents.len()
    }
}

/// Aggregate counters for one scan run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStatistics {
    /// Files seen across all roots.
    pub total_files: u64,
    /// Bytes across all seen files (hardlinked data counted per path).
    pub total_size: u64,
    /// Files under torrent roots.
    pub torrent_files: u64,
    /// Files under library roots.
    pub library_files: u64,
    /// Hardlink groups with two or more members.
    pub hardlink_groups: u64,
    /// Orphaned files detected.
    pub orphaned_files: u64,
    /// Bytes across orphaned files.
    pub orphaned_size: u64,
    /// Cross-seed groups detected.
    pub cross_seed_groups: u64,
    /// Torrents reported by the download client.
    pub torrents_count: u64,
    /// Items reported by Radarr.
    pub radarr_items: u64,
    /// Items reported by Sonarr.
    pub sonarr_items: u64,
    /// Wall-clock duration of the scan.
    pub scan_duration: Duration,
}

/// Immutable snapshot of one complete scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// When the scan finished.
    pub scanned_at: DateTime<Utc>,
    /// Aggregate counters.
    pub statistics: ScanStatistics,
    /// Torrents from the download client.
    pub torrents: Vec<TorrentRecord>,
    /// Items from Radarr.
    pub radarr_media: Vec<MediaRecord>,
    /// Items from Sonarr.
    pub sonarr_media: Vec<MediaRecord>,
    /// Hardlink groups found across all roots.
    pub hardlink_groups: Vec<HardlinkGroup>,
    /// One relationship per path seen by any source.
    pub relationships: Vec<FileRelationship>,
    /// Unclaimed main-content files.
    pub orphans: Vec<OrphanedFile>,
    /// Torrent groups sharing identical payload path sets.
    pub cross_seed_groups: Vec<CrossSeedGroup>,
    /// Non-fatal conditions hit along the way.
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    /// Whether any non-fatal condition was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_device_scoped() {
        let a = FsIdentity::new(1, 42);
        let b = FsIdentity::new(2, 42);
        assert_ne!(a, b);
        assert_eq!(a, FsIdentity::new(1, 42));
    }

    #[test]
    fn identity_from_metadata_matches_stat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"data").unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        let id = FsIdentity::from_metadata(&meta);

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            assert_eq!(id.inode, meta.ino());
            assert_eq!(id.device, meta.dev());
        }
        let _ = id;
    }

    #[test]
    fn torrent_total_size_sums_files() {
        let torrent = TorrentRecord {
            id: "abc".into(),
            name: "Example".into(),
            category: "movies".into(),
            save_path: PathBuf::from("/data/torrents"),
            state: "uploading".into(),
            added_at: Utc::now(),
            primary_tracker: None,
            files: vec![
                TorrentFileRef {
                    path: PathBuf::from("/data/torrents/a.mkv"),
                    size: 100,
                },
                TorrentFileRef {
                    path: PathBuf::from("/data/torrents/b.mkv"),
                    size: 50,
                },
            ],
        };
        assert_eq!(torrent.total_size(), 150);
    }

    #[test]
    fn relationship_tracking_predicates() {
        let mut rel = FileRelationship {
            file_path: PathBuf::from("/data/a.mkv"),
            size: 10,
            identity: None,
            link_count: 0,
            hardlinked_files: Vec::new(),
            torrent_refs: BTreeSet::new(),
            service_refs: BTreeSet::new(),
        };
        assert!(!rel.is_tracked());
        assert!(!rel.on_disk());

        rel.service_refs.insert(MediaService::Radarr);
        assert!(rel.is_tracked());
    }

    #[test]
    fn media_service_display() {
        assert_eq!(MediaService::Radarr.to_string(), "radarr");
        assert_eq!(MediaService::Sonarr.to_string(), "sonarr");
    }
}
