//! Application configuration.
//!
//! Loaded from a TOML file (explicit path, then default locations) with
//! serde defaults covering a typical single-host setup, so a missing file
//! still yields a usable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// qBittorrent connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QbittorrentConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Default for QbittorrentConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8080,
            username: "admin".into(),
            password: String::new(),
        }
    }
}

impl QbittorrentConfig {
    /// Base URL of the Web API.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Radarr connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarrConfig {
    pub host: String,
    pub port: u16,
    pub api_key: String,
}

impl Default for RadarrConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 7878,
            api_key: String::new(),
        }
    }
}

impl RadarrConfig {
    /// Base URL of the v3 API host.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Sonarr connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarrConfig {
    pub host: String,
    pub port: u16,
    pub api_key: String,
}

impl Default for SonarrConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8989,
            api_key: String::new(),
        }
    }
}

impl SonarrConfig {
    /// Base URL of the v3 API host.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Pure prefix swap from collaborator-reported paths to host paths.
///
/// Services running in containers report paths in their own namespace
/// (e.g. `/media/...`); the scanner needs the host's view. Total: a path
/// outside the remote base passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRemapper {
    /// Base path as the services report it.
    pub remote_base: PathBuf,
    /// Host filesystem path the remote base corresponds to.
    pub local_base: PathBuf,
}

impl PathRemapper {
    /// Create a remapper between the two bases.
    pub fn new(remote_base: impl Into<PathBuf>, local_base: impl Into<PathBuf>) -> Self {
        Self {
            remote_base: remote_base.into(),
            local_base: local_base.into(),
        }
    }

    /// Translate a collaborator-reported path into host path space.
    pub fn remap(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.remote_base) {
            Ok(rest) => self.local_base.join(rest),
            Err(_) => path.to_path_buf(),
        }
    }
}

/// Filesystem roots and container path mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Roots the download client saves payloads under.
    pub torrent_roots: Vec<PathBuf>,
    /// Roots the library managers organize media under.
    pub library_roots: Vec<PathBuf>,
    /// Base path as reported by the services.
    pub remote_path_base: PathBuf,
    /// Actual host path the services' base corresponds to.
    pub local_path_base: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            torrent_roots: vec![
                PathBuf::from("/data/media/torrents/movies"),
                PathBuf::from("/data/media/torrents/tv"),
            ],
            library_roots: vec![
                PathBuf::from("/data/media/libraries/movies"),
                PathBuf::from("/data/media/libraries/tv"),
            ],
            remote_path_base: PathBuf::from("/media"),
            local_path_base: PathBuf::from("/data/media"),
        }
    }
}

impl PathsConfig {
    /// The remapper translating service-reported paths onto these roots.
    pub fn remapper(&self) -> PathRemapper {
        PathRemapper::new(&self.remote_path_base, &self.local_path_base)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub qbittorrent: QbittorrentConfig,
    pub radarr: RadarrConfig,
    pub sonarr: SonarrConfig,
    pub paths: PathsConfig,
}

impl AppConfig {
    /// Load configuration from an explicit path, or search the default
    /// locations, falling back to built-in defaults when nothing exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        for candidate in Self::default_locations() {
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Read and parse one TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from("seedscan.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("seedscan/config.toml"));
        }
        locations.push(PathBuf::from("/etc/seedscan/config.toml"));
        locations
    }
}
