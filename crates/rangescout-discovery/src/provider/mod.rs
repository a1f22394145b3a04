//! Address provider abstraction and its Google and HERE back-ends.

pub mod google;
pub mod here;

use std::time::Duration;

use async_trait::async_trait;
use rangescout_core::{AppConfig, Coordinates, Language, ProviderKind};
use reqwest::{Client, Url};

use crate::error::ProviderError;
use crate::types::RawCandidate;

/// How grid points may be dispatched to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMode {
    /// Points are fetched through a bounded worker pool.
    Concurrent,
    /// One point in flight at a time.
    Serial,
}

/// What an empty response for one point means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Each call samples a single spot; empty answers are normal.
    PerPoint,
    /// Each call covers the whole radius; an empty answer means the area has
    /// nothing to offer and the sweep stops.
    Dense,
}

/// Candidates returned for one grid point.
#[derive(Debug, Clone, Default)]
pub struct ProviderBatch {
    pub candidates: Vec<RawCandidate>,
    pub upstream_calls: u32,
}

/// A bulk "addresses near a point" back-end.
///
/// Implementations return raw candidates only; distances are attached by the
/// orchestrator from the resolved source.
#[async_trait]
pub trait AddressProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Grid step this provider's resolution calls for.
    fn grid_step_meters(&self) -> u32;

    fn sweep_mode(&self) -> SweepMode;

    fn coverage(&self) -> Coverage;

    fn supported_languages(&self) -> &'static [Language];

    async fn fetch(
        &self,
        point: Coordinates,
        radius_meters: u32,
        language: Language,
    ) -> Result<ProviderBatch, ProviderError>;
}

/// HTTP and retry settings shared by the provider clients.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "rangescout/0.1 (address-discovery)".to_string(),
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

pub(crate) fn build_http_client(settings: &ClientSettings) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(settings.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Ensures the base URL ends with exactly one slash so relative joins append
/// to it rather than replacing its last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, ProviderError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Parses `Retry-After` as whole seconds, defaulting to 60.
pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(60)
}

/// Trims and drops empty strings.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base_url_normalises_trailing_slash() {
        let url = parse_base_url("http://127.0.0.1:9000///").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/");
        let joined = url.join("v1/revgeocode").unwrap();
        assert_eq!(joined.path(), "/v1/revgeocode");
    }

    #[test]
    fn parse_base_url_keeps_path_prefix() {
        let url = parse_base_url("http://localhost/proxy").unwrap();
        assert_eq!(url.join("maps/api/geocode/json").unwrap().path(), "/proxy/maps/api/geocode/json");
    }

    #[test]
    fn parse_base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ProviderError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn retry_after_defaults_to_sixty_seconds() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(retry_after_secs(&headers), 60);
        headers.insert(reqwest::header::RETRY_AFTER, "5".parse().unwrap());
        assert_eq!(retry_after_secs(&headers), 5);
    }

    #[test]
    fn non_empty_trims_and_filters() {
        assert_eq!(non_empty(Some("  x ")), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
