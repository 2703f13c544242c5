//! Radarr v3 API client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use seedscan_core::{
    MediaProvider, MediaRecord, MediaService, PathRemapper, ProviderError, RadarrConfig,
};

use crate::{check_status, transport_error};

const SERVICE: &str = "radarr";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieDto {
    id: i64,
    title: String,
    path: String,
    #[serde(default)]
    monitored: bool,
    #[serde(default)]
    has_file: bool,
    #[serde(default)]
    movie_file: Option<MovieFileDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovieFileDto {
    path: String,
}

/// Client for the Radarr v3 API.
pub struct RadarrClient {
    http: Client,
    base_url: String,
    api_key: String,
    remapper: PathRemapper,
}

impl RadarrClient {
    /// Build a client from connection settings and the path remapper.
    pub fn new(config: &RadarrConfig, remapper: PathRemapper) -> Result<Self, ProviderError> {
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

    fn to_record(&self, movie: MovieDto) -> MediaRecord {
        // Radarr only reports a movie file when it believes one exists.
        let file_path = movie
            .movie_file
            .filter(|_| movie.has_file)
            .map(|f| self.remapper.remap(Path::new(&f.path)));

        MediaRecord {
            id: movie.id,
            title: movie.title.into(),
            service: MediaService::Radarr,
            file_path,
            folder_path: self.remapper.remap(Path::new(&movie.path)),
            monitored: movie.monitored,
            has_file: movie.has_file,
        }
    }
}

#[async_trait]
impl MediaProvider for RadarrClient {
    fn service(&self) -> MediaService {
        MediaService::Radarr
    }

    async fn items(&self) -> Result<Vec<MediaRecord>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/api/v3/movie", self.base_url))
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        let movies: Vec<MovieDto> = check_status(SERVICE, response)?
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        let records: Vec<MediaRecord> = movies.into_iter().map(|m| self.to_record(m)).collect();
        info!(count = records.len(), "retrieved movies from Radarr");
        Ok(records)
    }

    async fn item_files(&self, item: &MediaRecord) -> Result<Vec<PathBuf>, ProviderError> {
        // Movies track a single file directly on the record.
        Ok(item.file_path.clone().into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RadarrClient {
        RadarrClient::new(
            &RadarrConfig::default(),
            PathRemapper::new("/media", "/data/media"),
        )
        .unwrap()
    }

    #[test]
    fn movie_decodes_and_remaps() {
        let json = r#"{
            "id": 12,
            "title": "Movie (2020)",
            "path": "/media/libraries/movies/Movie (2020)",
            "monitored": true,
            "hasFile": true,
            "movieFile": {
                "path": "/media/libraries/movies/Movie (2020)/Movie (2020).mkv"
            }
        }"#;
        let dto: MovieDto = serde_json::from_str(json).unwrap();
        let record = client().to_record(dto);

        assert_eq!(record.service, MediaService::Radarr);
        assert_eq!(
            record.file_path.as_deref(),
            Some(Path::new(
                "/data/media/libraries/movies/Movie (2020)/Movie (2020).mkv"
            ))
        );
        assert_eq!(
            record.folder_path,
            Path::new("/data/media/libraries/movies/Movie (2020)")
        );
    }

    #[test]
    fn movie_without_file_has_no_path() {
        let json = r#"{
            "id": 13,
            "title": "Awaited (2027)",
            "path": "/media/libraries/movies/Awaited (2027)",
            "monitored": true,
            "hasFile": false
        }"#;
        let dto: MovieDto = serde_json::from_str(json).unwrap();
        let record = client().to_record(dto);

        assert!(record.file_path.is_none());
        assert!(!record.has_file);
    }
}
