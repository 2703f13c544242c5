//! Per-path relationship construction.

use std::collections::BTreeMap;
use std::path::PathBuf;

use seedscan_core::{FileRecord, FileRelationship};
use seedscan_scan::HardlinkIndex;

use crate::tracking::TrackingMap;

/// Joins filesystem records, the hardlink index, and tracking claims into
/// one `FileRelationship` per distinct path.
pub struct RelationshipBuilder;

impl RelationshipBuilder {
    /// Build relationships for the union of on-disk and tracked paths.
    ///
    /// The result is keyed and ordered by path; the sets inside each
    /// relationship make the content independent of source order. Paths
    /// claimed by a source but absent from disk still get an entry, with no
    /// identity and no siblings.
    pub fn build(
        files: &[FileRecord],
        index: &HardlinkIndex,
        tracking: &TrackingMap,
    ) -> Vec<FileRelationship> {
        let mut by_path: BTreeMap<PathBuf, FileRelationship> = BTreeMap::new();

        for record in files {
            by_path
                .entry(record.path.clone())
                .or_insert_with(|| Self::from_disk(record, index));
        }

        for (path, claims) in tracking.iter() {
            let relationship = by_path
                .entry(path.clone())
                .or_insert_with(|| Self::from_claims_only(path.clone(), claims.size_hint));
            relationship.torrent_refs.extend(claims.torrent_ids.iter().cloned());
            relationship.service_refs.extend(claims.services.iter().copied());
        }

        by_path.into_values().collect()
    }

    fn from_disk(record: &FileRecord, index: &HardlinkIndex) -> FileRelationship {
        let hardlinked_files = index
            .paths_for(&record.identity)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p != &record.path)
            .collect();

        FileRelationship {
            file_path: record.path.clone(),
            size: record.size,
            identity: Some(record.identity),
            link_count: record.link_count,
            hardlinked_files,
            torrent_refs: Default::default(),
            service_refs: Default::default(),
        }
    }

    // A tracked path the filesystem walk never saw: moved, deleted, or a
    // path-remap mismatch. Valid, just degenerate.
    fn from_claims_only(path: PathBuf, size_hint: Option<u64>) -> FileRelationship {
        FileRelationship {
            file_path: path,
            size: size_hint.unwrap_or(0),
            identity: None,
            link_count: 0,
            hardlinked_files: Vec::new(),
            torrent_refs: Default::default(),
            service_refs: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::TrackingAggregator;
    use chrono::Utc;
    use seedscan_core::{FsIdentity, MediaRecord, MediaService, TorrentFileRef, TorrentRecord};
    use std::collections::BTreeSet;
    use std::path::Path;

    fn record(path: &str, device: u64, inode: u64, links: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size: 500,
            identity: FsIdentity::new(device, inode),
            link_count: links,
            modified: Utc::now(),
        }
    }

    fn torrent(id: &str, paths: &[&str]) -> TorrentRecord {
        TorrentRecord {
            id: id.into(),
            name: id.into(),
            category: "".into(),
            save_path: PathBuf::from("/data/torrents"),
            state: "uploading".into(),
            added_at: Utc::now(),
            primary_tracker: None,
            files: paths
                .iter()
                .map(|p| TorrentFileRef {
                    path: PathBuf::from(p),
                    size: 500,
                })
                .collect(),
        }
    }

    #[test]
    fn no_path_is_dropped() {
        let on_disk = vec![
            record("/data/torrents/a.mkv", 1, 1, 1),
            record("/data/libraries/b.mkv", 1, 2, 1),
        ];
        let index = HardlinkIndex::new();
        for r in &on_disk {
            index.insert(r);
        }

        let mut aggregator = TrackingAggregator::new();
        aggregator.record_torrents(&[torrent("t1", &["/data/torrents/a.mkv", "/data/torrents/gone.mkv"])]);
        aggregator.record_media(&[MediaRecord {
            id: 9,
            title: "B".into(),
            service: MediaService::Radarr,
            file_path: Some(PathBuf::from("/data/libraries/b.mkv")),
            folder_path: PathBuf::from("/data/libraries"),
            monitored: true,
            has_file: true,
        }]);
        let tracking = aggregator.finish();

        let relationships = RelationshipBuilder::build(&on_disk, &index, &tracking);

        let keys: BTreeSet<_> = relationships.iter().map(|r| r.file_path.clone()).collect();
        let expected: BTreeSet<PathBuf> = [
            "/data/torrents/a.mkv",
            "/data/torrents/gone.mkv",
            "/data/libraries/b.mkv",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn tracked_but_missing_path_is_degenerate_not_fatal() {
        let index = HardlinkIndex::new();
        let mut aggregator = TrackingAggregator::new();
        aggregator.record_torrents(&[torrent("t1", &["/data/torrents/moved.mkv"])]);
        let tracking = aggregator.finish();

        let relationships = RelationshipBuilder::build(&[], &index, &tracking);

        assert_eq!(relationships.len(), 1);
        let rel = &relationships[0];
        assert!(rel.identity.is_none());
        assert!(rel.hardlinked_files.is_empty());
        assert_eq!(rel.size, 500);
        assert!(rel.torrent_refs.contains("t1"));
    }

    #[test]
    fn hardlinked_siblings_exclude_self() {
        let a = record("/data/torrents/x.mkv", 1, 7, 2);
        let b = record("/data/libraries/x.mkv", 1, 7, 2);
        let index = HardlinkIndex::new();
        index.insert(&a);
        index.insert(&b);

        let relationships =
            RelationshipBuilder::build(&[a.clone(), b.clone()], &index, &TrackingMap::default());

        for rel in &relationships {
            assert_eq!(rel.hardlinked_files.len(), 1);
            assert_ne!(rel.hardlinked_files[0], rel.file_path);
        }
    }

    #[test]
    fn source_order_does_not_change_content() {
        let on_disk = vec![record("/data/a.mkv", 1, 1, 1)];
        let index = HardlinkIndex::new();
        index.insert(&on_disk[0]);

        let media = MediaRecord {
            id: 1,
            title: "A".into(),
            service: MediaService::Sonarr,
            file_path: Some(PathBuf::from("/data/a.mkv")),
            folder_path: PathBuf::from("/data"),
            monitored: true,
            has_file: true,
        };

        let mut forward = TrackingAggregator::new();
        forward.record_torrents(&[torrent("t1", &["/data/a.mkv"])]);
        forward.record_media(std::slice::from_ref(&media));

        let mut reverse = TrackingAggregator::new();
        reverse.record_media(std::slice::from_ref(&media));
        reverse.record_torrents(&[torrent("t1", &["/data/a.mkv"])]);

        let built_forward = RelationshipBuilder::build(&on_disk, &index, &forward.finish());
        let built_reverse = RelationshipBuilder::build(&on_disk, &index, &reverse.finish());

        assert_eq!(built_forward.len(), built_reverse.len());
        let f = &built_forward[0];
        let r = &built_reverse[0];
        assert_eq!(f.torrent_refs, r.torrent_refs);
        assert_eq!(f.service_refs, r.service_refs);
    }

    #[test]
    fn on_disk_untracked_path_has_empty_refs() {
        let on_disk = vec![record("/data/torrents/stray.mkv", 1, 3, 1)];
        let index = HardlinkIndex::new();
        index.insert(&on_disk[0]);

        let relationships =
            RelationshipBuilder::build(&on_disk, &index, &TrackingMap::default());

        let rel = &relationships[0];
        assert_eq!(rel.file_path, Path::new("/data/torrents/stray.mkv"));
        assert!(rel.on_disk());
        assert!(!rel.is_tracked());
    }
}
