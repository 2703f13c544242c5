//! qBittorrent Web API client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use compact_str::CompactString;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use seedscan_core::{
    PathRemapper, ProviderError, QbittorrentConfig, TorrentFileRef, TorrentProvider, TorrentRecord,
};

use crate::{check_status, transport_error};

const SERVICE: &str = "qbittorrent";

#[derive(Debug, Deserialize)]
struct TorrentInfoDto {
    hash: String,
    name: String,
    #[serde(default)]
    category: String,
    save_path: String,
    state: String,
    #[serde(default)]
    added_on: i64,
}

#[derive(Debug, Deserialize)]
struct TorrentFileDto {
    name: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct TrackerDto {
    url: String,
}

/// Client for the qBittorrent Web API (v2).
///
/// Authenticates once per fetch; the session cookie lives in the reqwest
/// cookie store.
pub struct QbittorrentClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    remapper: PathRemapper,
}

impl QbittorrentClient {
    /// Build a client from connection settings and the path remapper.
    pub fn new(config: &QbittorrentConfig, remapper: PathRemapper) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Api {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.url(),
            username: config.username.clone(),
            password: config.password.clone(),
            remapper,
        })
    }

    async fn login(&self) -> Result<(), ProviderError> {
        let response = self
            .http
            .post(format!("{}/api/v2/auth/login", self.base_url))
            .form(&[("username", &self.username), ("password", &self.password)])
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        let response = check_status(SERVICE, response)?;
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        // The auth endpoint answers 200 for both outcomes; the body decides.
        if body.trim() != "Ok." {
            return Err(ProviderError::Api {
                service: SERVICE,
                message: format!("login rejected: {body}"),
            });
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        check_status(SERVICE, response)?
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, e))
    }

    /// First tracker that is not a `**`-prefixed DHT/PeX/LSD pseudo-entry.
    fn primary_tracker(trackers: &[TrackerDto]) -> Option<CompactString> {
        trackers
            .iter()
            .find(|t| !t.url.is_empty() && !t.url.starts_with("**"))
            .map(|t| CompactString::from(t.url.as_str()))
    }

    fn to_record(
        &self,
        info: TorrentInfoDto,
        files: Vec<TorrentFileDto>,
        trackers: Vec<TrackerDto>,
    ) -> TorrentRecord {
        let reported_save_path = Path::new(&info.save_path);
        let files = files
            .into_iter()
            .map(|f| TorrentFileRef {
                path: self.remapper.remap(&reported_save_path.join(&f.name)),
                size: f.size,
            })
            .collect();

        TorrentRecord {
            id: info.hash.into(),
            name: info.name.into(),
            category: info.category.into(),
            save_path: self.remapper.remap(reported_save_path),
            state: info.state.into(),
            added_at: DateTime::from_timestamp(info.added_on, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
            primary_tracker: Self::primary_tracker(&trackers),
            files,
        }
    }
}

#[async_trait]
impl TorrentProvider for QbittorrentClient {
    async fn torrents(&self) -> Result<Vec<TorrentRecord>, ProviderError> {
        self.login().await?;

        let infos: Vec<TorrentInfoDto> = self.get_json("/api/v2/torrents/info", &[]).await?;
        let mut records = Vec::with_capacity(infos.len());

        for info in infos {
            let files: Vec<TorrentFileDto> = self
                .get_json("/api/v2/torrents/files", &[("hash", info.hash.as_str())])
                .await?;
            let trackers: Vec<TrackerDto> = self
                .get_json("/api/v2/torrents/trackers", &[("hash", info.hash.as_str())])
                .await?;
            records.push(self.to_record(info, files, trackers));
        }

        info!(count = records.len(), "retrieved torrents from qBittorrent");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> QbittorrentClient {
        QbittorrentClient::new(
            &QbittorrentConfig::default(),
            PathRemapper::new("/media", "/data/media"),
        )
        .unwrap()
    }

    #[test]
    fn torrent_info_decodes_from_api_json() {
        let json = r#"{
            "hash": "8c212779b4abde7c6bc608063a0d008b7e40ce32",
            "name": "Movie.2020.1080p.BluRay",
            "category": "movies",
            "save_path": "/media/torrents/movies",
            "state": "uploading",
            "added_on": 1693526400,
            "progress": 1.0
        }"#;
        let dto: TorrentInfoDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.hash, "8c212779b4abde7c6bc608063a0d008b7e40ce32");
        assert_eq!(dto.save_path, "/media/torrents/movies");
    }

    #[test]
    fn record_paths_are_remapped_onto_the_host() {
        let info = TorrentInfoDto {
            hash: "abc".into(),
            name: "Movie".into(),
            category: String::new(),
            save_path: "/media/torrents/movies".into(),
            state: "uploading".into(),
            added_on: 1693526400,
        };
        let files = vec![TorrentFileDto {
            name: "Movie/movie.mkv".into(),
            size: 4096,
        }];

        let record = client().to_record(info, files, Vec::new());

        assert_eq!(
            record.save_path,
            Path::new("/data/media/torrents/movies")
        );
        assert_eq!(
            record.files[0].path,
            Path::new("/data/media/torrents/movies/Movie/movie.mkv")
        );
    }

    #[test]
    fn primary_tracker_skips_dht_pseudo_entries() {
        let trackers = vec![
            TrackerDto {
                url: "** [DHT] **".into(),
            },
            TrackerDto {
                url: "** [PeX] **".into(),
            },
            TrackerDto {
                url: "https://tracker.example/announce".into(),
            },
        ];
        assert_eq!(
            QbittorrentClient::primary_tracker(&trackers).as_deref(),
            Some("https://tracker.example/announce")
        );
        assert_eq!(QbittorrentClient::primary_tracker(&trackers[..2]), None);
    }

    #[test]
    fn missing_added_on_falls_back_to_epoch() {
        let json = r#"{
            "hash": "abc",
            "name": "Movie",
            "save_path": "/media/t",
            "state": "uploading"
        }"#;
        let dto: TorrentInfoDto = serde_json::from_str(json).unwrap();
        let record = client().to_record(dto, Vec::new(), Vec::new());
        assert_eq!(record.added_at, DateTime::UNIX_EPOCH);
    }
}
