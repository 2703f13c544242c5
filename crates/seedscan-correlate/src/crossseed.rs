//! Cross-seed detection.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use seedscan_core::{CrossSeedGroup, TorrentRecord};

/// Groups torrents whose payload path sets are identical.
///
/// Comparison is over the exact set of paths: order- and
/// duplicate-insensitive, but an extra or missing file breaks the match.
pub struct CrossSeedDetector;

impl CrossSeedDetector {
    /// Find all groups of two or more torrents sharing one payload set.
    pub fn detect(torrents: &[TorrentRecord]) -> Vec<CrossSeedGroup> {
        let mut by_payload: BTreeMap<BTreeSet<PathBuf>, Vec<&TorrentRecord>> = BTreeMap::new();

        for torrent in torrents {
            if torrent.files.is_empty() {
                continue;
            }
            let payload: BTreeSet<PathBuf> =
                torrent.files.iter().map(|f| f.path.clone()).collect();
            by_payload.entry(payload).or_default().push(torrent);
        }

        by_payload
            .into_iter()
            .filter(|(_, group)| group.len() >= 2)
            .map(|(payload, group)| {
                let trackers = group
                    .iter()
                    .filter_map(|t| t.primary_tracker.clone())
                    .collect();
                // Cross-seeded payloads are the same files, so any member's
                // sizes apply.
                let total_size = group[0].total_size();
                CrossSeedGroup {
                    files: payload.into_iter().collect(),
                    torrents: group.into_iter().cloned().collect(),
                    trackers,
                    total_size,
                }
            })
            .collect()
    }
}
