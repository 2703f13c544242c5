//! JWalk-based parallel directory walker.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use jwalk::{Parallelism, WalkDir};
use tracing::debug;

use seedscan_core::{FileRecord, FsIdentity, ScanError, ScanWarning, link_count};

use crate::hardlinks::HardlinkIndex;

/// Records and warnings produced by walking one or more roots.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// One record per regular file reached.
    pub records: Vec<FileRecord>,
    /// Per-file conditions that were skipped over.
    pub warnings: Vec<ScanWarning>,
}

impl WalkOutcome {
    /// Total bytes across all records.
    pub fn total_size(&self) -> u64 {
        self.records.iter().map(|r| r.size).sum()
    }

    fn absorb(&mut self, mut other: WalkOutcome) {
        self.records.append(&mut other.records);
        self.warnings.append(&mut other.warnings);
    }
}

/// Recursive walker emitting a `FileRecord` per regular file.
///
/// Symlinks are never followed as directories. Individual unreadable
/// entries are skipped with a warning; only an unreadable root top level is
/// fatal. A root that does not exist contributes zero files.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryWalker {
    threads: usize,
}

impl DirectoryWalker {
    /// Create a walker using the default rayon pool.
    pub fn new() -> Self {
        Self { threads: 0 }
    }

    /// Create a walker with a dedicated pool of `threads` threads.
    pub fn with_threads(threads: usize) -> Self {
        Self { threads }
    }

    /// Walk every root in turn, feeding the shared hardlink index.
    pub fn walk_roots(
        &self,
        roots: &[PathBuf],
        index: &HardlinkIndex,
    ) -> Result<WalkOutcome, ScanError> {
        let mut outcome = WalkOutcome::default();
        for root in roots {
            outcome.absorb(self.walk_root(root, index)?);
        }
        Ok(outcome)
    }

    /// Walk a single root.
    pub fn walk_root(
        &self,
        root: &Path,
        index: &HardlinkIndex,
    ) -> Result<WalkOutcome, ScanError> {
        if !root.exists() {
            debug!(root = %root.display(), "root does not exist, contributing zero files");
            return Ok(WalkOutcome::default());
        }

        // An existing root whose top level cannot be opened is fatal; per-file
        // problems deeper down are not.
        std::fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;
        let root = root
            .canonicalize()
            .map_err(|e| ScanError::io(root, e))?;

        let parallelism = match self.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: std::time::Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(&root)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false);

        let mut outcome = WalkOutcome::default();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    outcome.warnings.push(ScanWarning::read_error(path, &err));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(err) => {
                    outcome
                        .warnings
                        .push(ScanWarning::metadata_error(&path, &err));
                    continue;
                }
            };

            let modified: DateTime<Utc> = metadata.modified().unwrap_or(UNIX_EPOCH).into();
            let record = FileRecord {
                size: metadata.len(),
                identity: FsIdentity::from_metadata(&metadata),
                link_count: link_count(&metadata),
                modified,
                path,
            };

            index.insert(&record);
            outcome.records.push(record);
        }

        debug!(
            root = %root.display(),
            files = outcome.records.len(),
            warnings = outcome.warnings.len(),
            "walked root"
        );
        Ok(outcome)
    }
}

impl Default for DirectoryWalker {
    fn default() -> Self {
        Self::new()
    }
}
