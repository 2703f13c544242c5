//! Aggregation of tracking claims from all sources.
//!
//! Claims are folded into a mutable aggregator and frozen into an immutable
//! `TrackingMap` before anything downstream reads them, so no stage ever
//! observes a half-built mapping.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use compact_str::CompactString;

use seedscan_core::{MediaRecord, MediaService, TorrentRecord};

/// Everything claiming one path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathClaims {
    /// Info-hashes of torrents whose payload includes the path.
    pub torrent_ids: BTreeSet<CompactString>,
    /// Library services tracking the path.
    pub services: BTreeSet<MediaService>,
    /// Size reported by a tracking source, for paths missing from disk.
    pub size_hint: Option<u64>,
}

/// Frozen path → claims mapping.
#[derive(Debug, Clone, Default)]
pub struct TrackingMap {
    by_path: BTreeMap<PathBuf, PathClaims>,
}

impl TrackingMap {
    /// Claims for one path, if any source mentioned it.
    pub fn claims_for(&self, path: &Path) -> Option<&PathClaims> {
        self.by_path.get(path)
    }

    /// Whether any torrent's payload includes the path.
    pub fn is_torrent_tracked(&self, path: &Path) -> bool {
        self.claims_for(path)
            .is_some_and(|c| !c.torrent_ids.is_empty())
    }

    /// Whether any library service tracks the path.
    pub fn is_service_tracked(&self, path: &Path) -> bool {
        self.claims_for(path).is_some_and(|c| !c.services.is_empty())
    }

    /// Iterate all claimed paths with their claims.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &PathClaims)> {
        self.by_path.iter()
    }

    /// Number of distinct claimed paths.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Whether no source claimed anything.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Mutable fold of tracking claims; freeze with [`TrackingAggregator::finish`].
///
/// Duplicate claims from one source deduplicate (the sets absorb them);
/// claims from different sources accumulate on the same path.
#[derive(Debug, Default)]
pub struct TrackingAggregator {
    by_path: BTreeMap<PathBuf, PathClaims>,
}

impl TrackingAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in every payload path of the given torrents.
    pub fn record_torrents(&mut self, torrents: &[TorrentRecord]) {
        for torrent in torrents {
            for file in &torrent.files {
                let claims = self.by_path.entry(file.path.clone()).or_default();
                claims.torrent_ids.insert(torrent.id.clone());
                claims.size_hint.get_or_insert(file.size);
            }
        }
    }

    /// Fold in file-path-bearing media records.
    ///
    /// Records without a `file_path` (multi-file items) contribute nothing
    /// here; their files arrive via [`TrackingAggregator::record_enumerated`].
    pub fn record_media(&mut self, items: &[MediaRecord]) {
        for item in items {
            if let Some(path) = &item.file_path {
                self.by_path
                    .entry(path.clone())
                    .or_default()
                    .services
                    .insert(item.service);
            }
        }
    }

    /// Fold in paths enumerated for a folder-tracked service.
    pub fn record_enumerated(
        &mut self,
        service: MediaService,
        paths: impl IntoIterator<Item = PathBuf>,
    ) {
        for path in paths {
            self.by_path
                .entry(path)
                .or_default()
                .services
                .insert(service);
        }
    }

    /// Freeze into the immutable map consumed by the rest of the pipeline.
    pub fn finish(self) -> TrackingMap {
        TrackingMap {
            by_path: self.by_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use seedscan_core::TorrentFileRef;

    fn torrent(id: &str, paths: &[(&str, u64)]) -> TorrentRecord {
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
                .map(|(p, size)| TorrentFileRef {
                    path: PathBuf::from(p),
                    size: *size,
                })
                .collect(),
        }
    }

    fn media(service: MediaService, file_path: Option<&str>) -> MediaRecord {
        MediaRecord {
            id: 1,
            title: "Item".into(),
            service,
            file_path: file_path.map(PathBuf::from),
            folder_path: PathBuf::from("/data/libraries"),
            monitored: true,
            has_file: true,
        }
    }

    #[test]
    fn claims_accumulate_across_sources() {
        let mut aggregator = TrackingAggregator::new();
        aggregator.record_torrents(&[torrent("t1", &[("/data/a.mkv", 100)])]);
        aggregator.record_media(&[media(MediaService::Radarr, Some("/data/a.mkv"))]);

        let map = aggregator.finish();
        let claims = map.claims_for(Path::new("/data/a.mkv")).unwrap();
        assert_eq!(claims.torrent_ids.len(), 1);
        assert!(claims.services.contains(&MediaService::Radarr));
        assert_eq!(claims.size_hint, Some(100));
    }

    #[test]
    fn duplicate_claims_from_one_service_dedupe() {
        let mut aggregator = TrackingAggregator::new();
        aggregator.record_enumerated(
            MediaService::Sonarr,
            vec![PathBuf::from("/data/ep.mkv"), PathBuf::from("/data/ep.mkv")],
        );
        aggregator.record_media(&[media(MediaService::Sonarr, Some("/data/ep.mkv"))]);

        let map = aggregator.finish();
        let claims = map.claims_for(Path::new("/data/ep.mkv")).unwrap();
        assert_eq!(claims.services.len(), 1);
    }

    #[test]
    fn same_path_in_two_torrents_collects_both_ids() {
        let mut aggregator = TrackingAggregator::new();
        aggregator.record_torrents(&[
            torrent("t1", &[("/data/x.mkv", 10)]),
            torrent("t2", &[("/data/x.mkv", 10)]),
        ]);

        let map = aggregator.finish();
        let claims = map.claims_for(Path::new("/data/x.mkv")).unwrap();
        assert_eq!(claims.torrent_ids.len(), 2);
        assert!(map.is_torrent_tracked(Path::new("/data/x.mkv")));
        assert!(!map.is_service_tracked(Path::new("/data/x.mkv")));
    }

    #[test]
    fn folder_tracked_items_contribute_nothing_directly() {
        let mut aggregator = TrackingAggregator::new();
        aggregator.record_media(&[media(MediaService::Sonarr, None)]);
        assert!(aggregator.finish().is_empty());
    }
}
