//! HERE reverse-geocoding back-end.
//!
//! One `revgeocode` call returns up to [`MAX_ITEMS`] addresses inside a
//! circle, so a 50 m lattice is enough. HERE enforces a requests-per-minute
//! ceiling; every attempt passes through a [`RequestGate`] and the sweep is
//! run serially.

mod response;

use async_trait::async_trait;
use rangescout_core::{Coordinates, Language, ProviderKind};
use reqwest::{Client, Url};

use self::response::RevGeocodeResponse;
use super::{
    build_http_client, parse_base_url, retry_after_secs, AddressProvider, ClientSettings,
    Coverage, ProviderBatch, SweepMode,
};
use crate::error::ProviderError;
use crate::rate_limit::{retry_with_backoff, RequestGate};
use crate::types::RawCandidate;

const DEFAULT_BASE_URL: &str = "https://revgeocode.search.hereapi.com/";
const REVGEOCODE_PATH: &str = "v1/revgeocode";

pub const MAX_ITEMS: u32 = 100;
pub const HERE_GRID_STEP_METERS: u32 = 50;

/// Sweeps with HERE's native circle query.
pub struct HereAddressProvider {
    client: Client,
    api_key: String,
    endpoint: Url,
    gate: RequestGate,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HereAddressProvider {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_key: &str,
        settings: &ClientSettings,
        requests_per_minute: u32,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, settings, requests_per_minute, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        settings: &ClientSettings,
        requests_per_minute: u32,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = build_http_client(settings)?;
        let endpoint = parse_base_url(base_url)?.join(REVGEOCODE_PATH).map_err(|e| {
            ProviderError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            gate: RequestGate::per_minute(requests_per_minute),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    fn build_url(&self, point: Coordinates, radius_meters: u32, language: Language) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("in", &format!("circle:{point};r={radius_meters}"))
            .append_pair("types", "address")
            .append_pair("limit", &MAX_ITEMS.to_string())
            .append_pair("lang", language.bcp47())
            .append_pair("apiKey", &self.api_key);
        url
    }

    async fn revgeocode(&self, url: &Url) -> Result<Vec<RawCandidate>, ProviderError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                self.gate.wait().await;
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(reqwest::Error::without_url)?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(ProviderError::RateLimited {
                        provider: ProviderKind::Here,
                        retry_after_secs: retry_after_secs(response.headers()),
                    });
                }
                if !status.is_success() {
                    return Err(ProviderError::UnexpectedStatus {
                        provider: ProviderKind::Here,
                        status: status.as_u16(),
                        endpoint: REVGEOCODE_PATH.to_string(),
                    });
                }

                let body = response.text().await.map_err(reqwest::Error::without_url)?;
                let parsed: RevGeocodeResponse =
                    serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                        context: REVGEOCODE_PATH.to_string(),
                        source: e,
                    })?;

                Ok(parsed
                    .items
                    .into_iter()
                    .filter_map(response::RevGeocodeItem::into_candidate)
                    .collect())
            }
        })
        .await
    }
}

#[async_trait]
impl AddressProvider for HereAddressProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Here
    }

    fn grid_step_meters(&self) -> u32 {
        HERE_GRID_STEP_METERS
    }

    fn sweep_mode(&self) -> SweepMode {
        SweepMode::Serial
    }

    fn coverage(&self) -> Coverage {
        Coverage::Dense
    }

    fn supported_languages(&self) -> &'static [Language] {
        Language::ALL
    }

    async fn fetch(
        &self,
        point: Coordinates,
        radius_meters: u32,
        language: Language,
    ) -> Result<ProviderBatch, ProviderError> {
        let url = self.build_url(point, radius_meters, language);
        let candidates = self.revgeocode(&url).await?;
        Ok(ProviderBatch {
            candidates,
            upstream_calls: 1,
        })
    }
}
