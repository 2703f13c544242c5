//! Orphan detection over classified files.

use seedscan_core::{FileRecord, OrphanLocation, OrphanedFile};

use crate::tracking::TrackingMap;

/// Reason attached to unclaimed torrent-root files.
pub const TORRENT_ORPHAN_REASON: &str = "Not tracked by any torrent";

/// Reason attached to unclaimed library-root files.
pub const LIBRARY_ORPHAN_REASON: &str = "Not tracked by library services";

/// Set-difference orphan detection.
///
/// Inputs must already be Main-classified; classification and skip policy
/// live entirely in the classifier, not here. Detection is pure: the same
/// snapshot always produces the same orphan set.
pub struct OrphanDetector;

impl OrphanDetector {
    /// Find main-content files no tracking source claims.
    pub fn detect(
        torrent_main: &[FileRecord],
        library_main: &[FileRecord],
        tracking: &TrackingMap,
    ) -> Vec<OrphanedFile> {
        let mut orphans = Vec::new();

        for record in torrent_main {
            if !tracking.is_torrent_tracked(&record.path) {
                orphans.push(Self::orphan(record, OrphanLocation::TorrentRoot));
            }
        }

        for record in library_main {
            if !tracking.is_service_tracked(&record.path) {
                orphans.push(Self::orphan(record, OrphanLocation::LibraryRoot));
            }
        }

        orphans
    }

    fn orphan(record: &FileRecord, location: OrphanLocation) -> OrphanedFile {
        let reason = match location {
            OrphanLocation::TorrentRoot => TORRENT_ORPHAN_REASON,
            OrphanLocation::LibraryRoot => LIBRARY_ORPHAN_REASON,
        };
        OrphanedFile {
            path: record.path.clone(),
            size: record.size,
            location,
            reason: reason.to_string(),
            modified: record.modified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::TrackingAggregator;
    use chrono::Utc;
    use seedscan_core::{FsIdentity, MediaRecord, MediaService, TorrentFileRef, TorrentRecord};
    use std::path::PathBuf;

    fn record(path: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size: 700,
            identity: FsIdentity::new(1, 1),
            link_count: 1,
            modified: Utc::now(),
        }
    }

    fn tracking_with(torrent_paths: &[&str], radarr_paths: &[&str]) -> TrackingMap {
        let mut aggregator = TrackingAggregator::new();
        if !torrent_paths.is_empty() {
            aggregator.record_torrents(&[TorrentRecord {
                id: "t1".into(),
                name: "t1".into(),
                category: "".into(),
                save_path: PathBuf::from("/data/torrents"),
                state: "uploading".into(),
                added_at: Utc::now(),
                primary_tracker: None,
                files: torrent_paths
                    .iter()
                    .map(|p| TorrentFileRef {
                        path: PathBuf::from(p),
                        size: 700,
                    })
                    .collect(),
            }]);
        }
        let media: Vec<MediaRecord> = radarr_paths
            .iter()
            .enumerate()
            .map(|(i, p)| MediaRecord {
                id: i as i64,
                title: "M".into(),
                service: MediaService::Radarr,
                file_path: Some(PathBuf::from(p)),
                folder_path: PathBuf::from("/data/libraries"),
                monitored: true,
                has_file: true,
            })
            .collect();
        aggregator.record_media(&media);
        aggregator.finish()
    }

    #[test]
    fn unclaimed_torrent_file_is_orphaned() {
        let torrent_main = vec![record("/data/torrents/movies/stray.mkv")];
        let tracking = tracking_with(&["/data/torrents/movies/other.mkv"], &[]);

        let orphans = OrphanDetector::detect(&torrent_main, &[], &tracking);

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].location, OrphanLocation::TorrentRoot);
        assert_eq!(orphans[0].reason, TORRENT_ORPHAN_REASON);
    }

    #[test]
    fn claimed_files_are_not_orphaned() {
        let torrent_main = vec![record("/data/torrents/movies/movie.mkv")];
        let library_main = vec![record("/data/libraries/movies/movie.mkv")];
        let tracking = tracking_with(
            &["/data/torrents/movies/movie.mkv"],
            &["/data/libraries/movies/movie.mkv"],
        );

        let orphans = OrphanDetector::detect(&torrent_main, &library_main, &tracking);
        assert!(orphans.is_empty());
    }

    #[test]
    fn library_files_ignore_torrent_claims() {
        // A torrent claiming a library path does not save it from being a
        // library orphan; only media services count there.
        let library_main = vec![record("/data/libraries/movies/movie.mkv")];
        let tracking = tracking_with(&["/data/libraries/movies/movie.mkv"], &[]);

        let orphans = OrphanDetector::detect(&[], &library_main, &tracking);

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].location, OrphanLocation::LibraryRoot);
        assert_eq!(orphans[0].reason, LIBRARY_ORPHAN_REASON);
    }

    #[test]
    fn detection_is_idempotent() {
        let torrent_main = vec![
            record("/data/torrents/movies/a.mkv"),
            record("/data/torrents/movies/b.mkv"),
        ];
        let tracking = tracking_with(&["/data/torrents/movies/a.mkv"], &[]);

        let first = OrphanDetector::detect(&torrent_main, &[], &tracking);
        let second = OrphanDetector::detect(&torrent_main, &[], &tracking);

        let paths = |orphans: &[OrphanedFile]| {
            orphans.iter().map(|o| o.path.clone()).collect::<Vec<_>>()
        };
        assert_eq!(paths(&first), paths(&second));
    }
}
