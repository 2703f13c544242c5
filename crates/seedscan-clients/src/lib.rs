//! Service clients for seedscan.
//!
//! Thin decoded-record providers over the qBittorrent, Radarr, and Sonarr
//! HTTP APIs. Each client applies the configured path remapper before a
//! record leaves it, so the pipeline only ever sees host-filesystem paths.
//!
//! No client retries: a connection failure surfaces as
//! `ProviderError::Connection` and aborts the scan. Retry policy, if
//! wanted, belongs to the caller.

mod qbittorrent;
mod radarr;
mod sonarr;

pub use qbittorrent::QbittorrentClient;
pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;

use seedscan_core::ProviderError;

/// Map a transport failure onto the provider taxonomy.
///
/// Connect/timeout class errors mean "unreachable"; anything else means the
/// service answered with something unusable.
pub(crate) fn transport_error(service: &'static str, err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::Connection {
            service,
            message: err.to_string(),
        }
    } else {
        ProviderError::Api {
            service,
            message: err.to_string(),
        }
    }
}

/// Fail on non-2xx statuses with the status line as context.
pub(crate) fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    response.error_for_status().map_err(|err| ProviderError::Api {
        service,
        message: err.to_string(),
    })
}
