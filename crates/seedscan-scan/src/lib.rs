//! Filesystem scanning engine for seedscan.
//!
//! This crate walks the configured roots, indexes hardlink identities, and
//! classifies what it finds:
//!
//! - **`DirectoryWalker`** - parallel traversal via jwalk, one `FileRecord`
//!   per regular file
//! - **`HardlinkIndex`** - concurrent (device, inode) → paths index shared
//!   by all walkers
//! - **`FileClassifier`** - main/sample/extra/skipped partition with
//!   per-context size floors
//!
//! # Example
//!
//! ```rust,no_run
//! use seedscan_core::RootKind;
//! use seedscan_scan::{DirectoryWalker, FileClassifier, HardlinkIndex};
//!
//! let index = HardlinkIndex::new();
//! let outcome = DirectoryWalker::new()
//!     .walk_root("/data/media/torrents/movies".as_ref(), &index)
//!     .unwrap();
//!
//! let classified = FileClassifier::new().partition(&outcome.records, RootKind::Torrent);
//! println!(
//!     "{} main files, {} hardlink groups",
//!     classified.main.len(),
//!     index.groups().len()
//! );
//! ```

mod classify;
mod hardlinks;
mod walker;

pub use classify::{
    Classified, ClassifierConfig, ClassifierConfigBuilder, FileClass, FileClassifier,
    LIBRARY_MAIN_SIZE_FLOOR, TORRENT_MAIN_SIZE_FLOOR,
};
pub use hardlinks::HardlinkIndex;
pub use walker::{DirectoryWalker, WalkOutcome};

// Re-export core types for convenience
pub use seedscan_core::{FileRecord, FsIdentity, HardlinkGroup, RootKind, ScanError, ScanWarning};
