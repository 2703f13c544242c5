//! Sonarr v3 API client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use seedscan_core::{
    MediaProvider, MediaRecord, MediaService, PathRemapper, ProviderError, SonarrConfig,
};

use crate::{check_status, transport_error};

const SERVICE: &str = "sonarr";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesDto {
    id: i64,
    title: String,
    path: String,
    #[serde(default)]
    monitored: bool,
    #[serde(default)]
    statistics: Option<SeriesStatisticsDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesStatisticsDto {
    #[serde(default)]
    episode_file_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeFileDto {
    path: String,
}

/// Client for the Sonarr v3 API.
///
/// Series are folder-tracked: records carry no `file_path`, and episode
/// files come from the per-series enumeration endpoint.
pub struct SonarrClient {
    http: Client,
    base_url: String,
    api_key: String,
    remapper: PathRemapper,
}

impl SonarrClient {
    /// Build a client from connection settings and the path remapper.
    pub fn new(config: &SonarrConfig, remapper: PathRemapper) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Api {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: config.url(),
            api_key: config.api_key.clone(),
            remapper,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        check_status(SERVICE, response)?
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, e))
    }

    fn to_record(&self, series: SeriesDto) -> MediaRecord {
        let has_file = series
            .statistics
            .as_ref()
            .is_some_and(|s| s.episode_file_count > 0);

        MediaRecord {
            id: series.id,
            title: series.title.into(),
            service: MediaService::Sonarr,
            // Series span many files; enumeration fills them in.
            file_path: None,
            folder_path: self.remapper.remap(Path::new(&series.path)),
            monitored: series.monitored,
            has_file,
        }
    }
}

#[async_trait]
impl MediaProvider for SonarrClient {
    fn service(&self) -> MediaService {
        MediaService::Sonarr
    }

    async fn items(&self) -> Result<Vec<MediaRecord>, ProviderError> {
        let series: Vec<SeriesDto> = self.get_json("/api/v3/series", &[]).await?;
        let records: Vec<MediaRecord> = series.into_iter().map(|s| self.to_record(s)).collect();
        info!(count = records.len(), "retrieved series from Sonarr");
        Ok(records)
    }

    async fn item_files(&self, item: &MediaRecord) -> Result<Vec<PathBuf>, ProviderError> {
        let episode_files: Vec<EpisodeFileDto> = self
            .get_json(
                "/api/v3/episodefile",
                &[("seriesId", item.id.to_string())],
            )
            .await?;

        let mut paths = Vec::with_capacity(episode_files.len());
        for file in episode_files {
            let path = self.remapper.remap(Path::new(&file.path));
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}
