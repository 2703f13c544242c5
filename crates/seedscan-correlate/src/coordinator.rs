//! Scan orchestration.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use seedscan_core::{
    HardlinkGroup, MediaProvider, MediaRecord, OrphanedFile, PathsConfig, RootKind, ScanError,
    ScanReport, ScanStatistics, ScanWarning, TorrentProvider, WarningKind,
};
use seedscan_scan::{DirectoryWalker, FileClassifier, HardlinkIndex};

use crate::crossseed::CrossSeedDetector;
use crate::orphans::OrphanDetector;
use crate::relations::RelationshipBuilder;
use crate::tracking::TrackingAggregator;

/// Runs the full correlation pipeline in its fixed order.
///
/// Source fetches and the two root-category walks run concurrently; every
/// later stage consumes the previous stage's output read-only. Cancellation
/// is checked between stages, never mid-walk, and a cancelled scan returns
/// no partial result.
pub struct ScanCoordinator {
    torrent_provider: Arc<dyn TorrentProvider>,
    radarr: Arc<dyn MediaProvider>,
    sonarr: Arc<dyn MediaProvider>,
    paths: PathsConfig,
    classifier: FileClassifier,
    walker: DirectoryWalker,
    cancel: CancellationToken,
}

impl ScanCoordinator {
    /// Create a coordinator over the three collaborators and the configured
    /// roots, with default classification policy.
    pub fn new(
        torrent_provider: Arc<dyn TorrentProvider>,
        radarr: Arc<dyn MediaProvider>,
        sonarr: Arc<dyn MediaProvider>,
        paths: PathsConfig,
    ) -> Self {
        Self {
            torrent_provider,
            radarr,
            sonarr,
            paths,
            classifier: FileClassifier::new(),
            walker: DirectoryWalker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the classification policy.
    pub fn with_classifier(mut self, classifier: FileClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Attach a cancellation token checked between pipeline stages.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the complete pipeline and return one immutable snapshot.
    pub async fn run_full_scan(&self) -> Result<ScanReport, ScanError> {
        let started = Instant::now();
        info!("starting full scan");

        // 1. Fetch the three sources. Mutually independent, joined before
        //    anything downstream needs them; any failure aborts the scan.
        self.checkpoint()?;
        let (torrents, radarr_media, sonarr_media) = tokio::try_join!(
            self.torrent_provider.torrents(),
            self.radarr.items(),
            self.sonarr.items(),
        )?;
        info!(
            torrents = torrents.len(),
            radarr = radarr_media.len(),
            sonarr = sonarr_media.len(),
            "fetched tracking sources"
        );

        // 2. Walk both root categories into one shared hardlink index.
        //    Cross-seeded content hardlinked between a torrent root and a
        //    library root must land in a single identity entry.
        self.checkpoint()?;
        let index = Arc::new(HardlinkIndex::new());
        let walker = self.walker;
        let torrent_roots = self.paths.torrent_roots.clone();
        let library_roots = self.paths.library_roots.clone();
        let torrent_index = Arc::clone(&index);
        let library_index = Arc::clone(&index);
        let (torrent_walk, library_walk) = tokio::join!(
            tokio::task::spawn_blocking(move || walker.walk_roots(&torrent_roots, &torrent_index)),
            tokio::task::spawn_blocking(move || walker.walk_roots(&library_roots, &library_index)),
        );
        let torrent_out = torrent_walk
            .map_err(|e| ScanError::other(format!("torrent walk task failed: {e}")))??;
        let library_out = library_walk
            .map_err(|e| ScanError::other(format!("library walk task failed: {e}")))??;

        let total_size = torrent_out.total_size() + library_out.total_size();
        let mut warnings = Vec::new();
        warnings.extend(torrent_out.warnings);
        warnings.extend(library_out.warnings);
        let torrent_records = torrent_out.records;
        let library_records = library_out.records;

        // 3. Classify per root context.
        self.checkpoint()?;
        let torrent_classified = self
            .classifier
            .partition(&torrent_records, RootKind::Torrent);
        let library_classified = self
            .classifier
            .partition(&library_records, RootKind::Library);

        // 4. Hardlink groups from the shared index.
        let hardlink_groups = index.groups();

        // 5. Fold tracking claims, degrading per item on enumeration
        //    failures.
        self.checkpoint()?;
        let mut aggregator = TrackingAggregator::new();
        aggregator.record_torrents(&torrents);
        aggregator.record_media(&radarr_media);
        aggregator.record_media(&sonarr_media);
        self.enumerate_folder_tracked(&self.radarr, &radarr_media, &mut aggregator, &mut warnings)
            .await;
        self.enumerate_folder_tracked(&self.sonarr, &sonarr_media, &mut aggregator, &mut warnings)
            .await;
        let tracking = aggregator.finish();

        // 6. Relationships over the union of on-disk and tracked paths.
        self.checkpoint()?;
        let all_records: Vec<_> = torrent_records
            .iter()
            .chain(&library_records)
            .cloned()
            .collect();
        let relationships = RelationshipBuilder::build(&all_records, &index, &tracking);

        // 7. Orphans over Main-classified records only.
        self.checkpoint()?;
        let orphans = OrphanDetector::detect(
            &torrent_classified.main,
            &library_classified.main,
            &tracking,
        );

        // 8. Cross-seed groups.
        self.checkpoint()?;
        let cross_seed_groups = CrossSeedDetector::detect(&torrents);

        let statistics = ScanStatistics {
            total_files: all_records.len() as u64,
            total_size,
            torrent_files: torrent_records.len() as u64,
            library_files: library_records.len() as u64,
            hardlink_groups: hardlink_groups.len() as u64,
            orphaned_files: orphans.len() as u64,
            orphaned_size: orphans.iter().map(|o| o.size).sum(),
            cross_seed_groups: cross_seed_groups.len() as u64,
            torrents_count: torrents.len() as u64,
            radarr_items: radarr_media.len() as u64,
            sonarr_items: sonarr_media.len() as u64,
            scan_duration: started.elapsed(),
        };
        info!(
            files = statistics.total_files,
            orphans = statistics.orphaned_files,
            duration_ms = statistics.scan_duration.as_millis() as u64,
            "scan completed"
        );

        Ok(ScanReport {
            scanned_at: Utc::now(),
            statistics,
            torrents,
            radarr_media,
            sonarr_media,
            hardlink_groups,
            relationships,
            orphans,
            cross_seed_groups,
            warnings,
        })
    }

    /// Run the pipeline and keep only the orphan list.
    pub async fn run_orphan_scan(&self) -> Result<Vec<OrphanedFile>, ScanError> {
        Ok(self.run_full_scan().await?.orphans)
    }

    /// Run the pipeline and keep only the hardlink groups.
    pub async fn run_hardlink_scan(&self) -> Result<Vec<HardlinkGroup>, ScanError> {
        Ok(self.run_full_scan().await?.hardlink_groups)
    }

    /// Enumerate files for items tracked only at folder level.
    ///
    /// One failing item costs only its own paths; the scan continues with a
    /// warning.
    async fn enumerate_folder_tracked(
        &self,
        provider: &Arc<dyn MediaProvider>,
        items: &[MediaRecord],
        aggregator: &mut TrackingAggregator,
        warnings: &mut Vec<ScanWarning>,
    ) {
        for item in items {
            if item.file_path.is_some() || !item.has_file {
                continue;
            }
            match provider.item_files(item).await {
                Ok(paths) => aggregator.record_enumerated(provider.service(), paths),
                Err(err) => {
                    warn!(
                        service = %provider.service(),
                        item = %item.title,
                        error = %err,
                        "file enumeration failed, item contributes no paths"
                    );
                    warnings.push(ScanWarning::new(
                        item.folder_path.clone(),
                        format!("enumeration failed for {}: {err}", item.title),
                        WarningKind::Enumeration,
                    ));
                }
            }
        }
    }

    fn checkpoint(&self) -> Result<(), ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        Ok(())
    }
}
