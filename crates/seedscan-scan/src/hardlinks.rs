//! Identity-keyed path index for hardlink grouping.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use seedscan_core::{FileRecord, FsIdentity, HardlinkGroup};

#[derive(Debug, Default)]
struct IdentityEntry {
    size: u64,
    paths: Vec<PathBuf>,
}

/// Groups scanned files by their (device, inode) identity.
///
/// The index is populated concurrently by the walkers for each root
/// category; hardlinked content shared between a torrent root and a library
/// root lands in one entry regardless of which walker sees it first. The
/// same index then serves both group emission and per-file sibling lookup.
#[derive(Debug, Default)]
pub struct HardlinkIndex {
    entries: DashMap<FsIdentity, IdentityEntry>,
}

impl HardlinkIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Record one scanned file under its identity.
    ///
    /// Re-inserting a path already known for its identity is a no-op, so
    /// overlapping roots do not inflate groups.
    pub fn insert(&self, record: &FileRecord) {
        let mut entry = self.entries.entry(record.identity).or_default();
        entry.size = record.size;
        if !entry.paths.contains(&record.path) {
            entry.paths.push(record.path.clone());
        }
    }

    /// All paths known for an identity, or `None` if it was never seen.
    pub fn paths_for(&self, identity: &FsIdentity) -> Option<Vec<PathBuf>> {
        self.entries.get(identity).map(|e| e.paths.clone())
    }

    /// The full member set of the group `path` belongs to.
    ///
    /// Falls back to `[path]` when the path cannot be stat'ed or has no
    /// known siblings.
    pub fn hardlinks_for(&self, path: &Path) -> Vec<PathBuf> {
        let Ok(metadata) = std::fs::symlink_metadata(path) else {
            return vec![path.to_path_buf()];
        };
        let identity = FsIdentity::from_metadata(&metadata);
        match self.paths_for(&identity) {
            Some(paths) if !paths.is_empty() => paths,
            _ => vec![path.to_path_buf()],
        }
    }

    /// Emit all groups with two or more members.
    ///
    /// Member lists are sorted, and groups are ordered by their first
    /// member, so output is stable across runs regardless of walk order.
    pub fn groups(&self) -> Vec<HardlinkGroup> {
        let mut groups: Vec<HardlinkGroup> = self
            .entries
            .iter()
            .filter(|entry| entry.paths.len() >= 2)
            .map(|entry| {
                let mut files = entry.paths.clone();
                files.sort();
                HardlinkGroup {
                    identity: *entry.key(),
                    link_count: files.len() as u64,
                    file_size: entry.size,
                    files,
                }
            })
            .collect();
        groups.sort_by(|a, b| a.files.cmp(&b.files));
        groups
    }

    /// Number of distinct identities seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has seen anything at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
