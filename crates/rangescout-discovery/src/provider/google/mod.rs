//! Google Geocoding back-end.
//!
//! Google has no bulk "addresses near a point" call, so the provider
//! reverse-geocodes every grid cell on a fine 20 m lattice. The same client
//! also serves as the [`PlaceResolver`] for the sweep source.

mod response;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use rangescout_core::{Coordinates, CountryCode, Language, ProviderKind};
use reqwest::{Client, Url};

use self::response::{GeocodeResponse, GeocodeResult};
use super::{
    build_http_client, non_empty, parse_base_url, retry_after_secs, AddressProvider,
    ClientSettings, Coverage, ProviderBatch, SweepMode,
};
use crate::error::ProviderError;
use crate::rate_limit::retry_with_backoff;
use crate::resolver::PlaceResolver;
use crate::types::{normalize_full_address, GeocodedPlace, Location, RawCandidate};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const GEOCODE_PATH: &str = "maps/api/geocode/json";

/// Reverse lookups during a sweep only care about deliverable addresses.
const ADDRESS_RESULT_TYPES: &str = "street_address|premise";

pub const GOOGLE_GRID_STEP_METERS: u32 = 20;

/// Client for the Google Geocoding REST API.
///
/// Use [`GoogleGeocodingClient::new`] for production or
/// [`GoogleGeocodingClient::with_base_url`] to point at a mock server.
pub struct GoogleGeocodingClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GoogleGeocodingClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, settings: &ClientSettings) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        settings: &ClientSettings,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = build_http_client(settings)?;
        let endpoint = parse_base_url(base_url)?.join(GEOCODE_PATH).map_err(|e| {
            ProviderError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Forward-geocodes a free-text address, optionally restricted to
    /// `countries`.
    ///
    /// # Errors
    ///
    /// See [`GoogleGeocodingClient::reverse`].
    pub(crate) async fn forward(
        &self,
        address: &str,
        countries: &BTreeSet<CountryCode>,
        language: Option<Language>,
    ) -> Result<Vec<GeocodeResult>, ProviderError> {
        let mut params = vec![("address", address.to_string())];
        if !countries.is_empty() {
            let components = countries
                .iter()
                .map(|c| format!("country:{}", c.as_str().to_ascii_uppercase()))
                .collect::<Vec<_>>()
                .join("|");
            params.push(("components", components));
        }
        if let Some(language) = language {
            params.push(("language", language.code().to_string()));
        }
        self.geocode(&params, "geocode(address)").await
    }

    /// Reverse-geocodes one point. `ZERO_RESULTS` yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::RateLimited`] on HTTP 429 after retries.
    /// - [`ProviderError::UnexpectedStatus`] on other non-2xx statuses.
    /// - [`ProviderError::Api`] when the envelope status is neither `OK` nor
    ///   `ZERO_RESULTS`.
    /// - [`ProviderError::Deserialize`] if the body does not match the
    ///   expected shape.
    /// - [`ProviderError::Http`] on network failure.
    pub(crate) async fn reverse(
        &self,
        point: Coordinates,
        language: Option<Language>,
        result_type: Option<&str>,
    ) -> Result<Vec<GeocodeResult>, ProviderError> {
        let mut params = vec![("latlng", point.to_string())];
        if let Some(result_type) = result_type {
            params.push(("result_type", result_type.to_string()));
        }
        if let Some(language) = language {
            params.push(("language", language.code().to_string()));
        }
        self.geocode(&params, "geocode(latlng)").await
    }

    async fn geocode(
        &self,
        params: &[(&str, String)],
        context: &str,
    ) -> Result<Vec<GeocodeResult>, ProviderError> {
        let url = self.build_url(params);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(reqwest::Error::without_url)?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(ProviderError::RateLimited {
                        provider: ProviderKind::Google,
                        retry_after_secs: retry_after_secs(response.headers()),
                    });
                }
                if !status.is_success() {
                    return Err(ProviderError::UnexpectedStatus {
                        provider: ProviderKind::Google,
                        status: status.as_u16(),
                        endpoint: GEOCODE_PATH.to_string(),
                    });
                }

                let body = response.text().await.map_err(reqwest::Error::without_url)?;
                let envelope: GeocodeResponse =
                    serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                        context: context.to_string(),
                        source: e,
                    })?;

                match envelope.status.as_str() {
                    "OK" => Ok(envelope.results),
                    "ZERO_RESULTS" => Ok(Vec::new()),
                    _ => Err(ProviderError::Api {
                        provider: ProviderKind::Google,
                        message: envelope.error_message.unwrap_or_default(),
                        status: envelope.status,
                    }),
                }
            }
        })
        .await
    }

    /// Appends `params` and the key via [`Url::query_pairs_mut`] so every
    /// value is percent-encoded.
    fn build_url(&self, params: &[(&str, String)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }
}

fn is_allowed(result: &GeocodeResult, allowed: &BTreeSet<CountryCode>) -> bool {
    allowed.is_empty()
        || result
            .country_code()
            .is_some_and(|code| allowed.iter().any(|c| c.as_str() == code))
}

#[async_trait]
impl PlaceResolver for GoogleGeocodingClient {
    async fn resolve(
        &self,
        location: &Location,
        allowed_countries: &BTreeSet<CountryCode>,
        language: Option<Language>,
    ) -> Result<Option<GeocodedPlace>, ProviderError> {
        let results = match location {
            Location::Address(address) => {
                self.forward(address, allowed_countries, language).await?
            }
            Location::Coordinates(point) => self.reverse(*point, language, None).await?,
        };

        Ok(results
            .into_iter()
            .find(|r| is_allowed(r, allowed_countries))
            .map(GeocodedPlace::from))
    }
}

/// Sweeps by reverse-geocoding each grid cell.
pub struct GoogleAddressProvider {
    client: Arc<GoogleGeocodingClient>,
}

impl GoogleAddressProvider {
    #[must_use]
    pub fn new(client: Arc<GoogleGeocodingClient>) -> Self {
        Self { client }
    }
}

fn to_candidate(result: GeocodeResult) -> Option<RawCandidate> {
    let location = result.location()?;
    let country = non_empty(result.long_name("country"));
    let full_address = normalize_full_address(
        result.formatted_address.as_deref()?,
        country.as_deref(),
    );
    if full_address.is_empty() {
        return None;
    }

    Some(RawCandidate {
        full_address,
        street_name: non_empty(result.long_name("route")),
        street_number: non_empty(result.long_name("street_number")),
        postal_code: non_empty(result.long_name("postal_code")),
        locality: non_empty(
            result
                .long_name("locality")
                .or_else(|| result.long_name("postal_town")),
        ),
        country,
        location,
    })
}

#[async_trait]
impl AddressProvider for GoogleAddressProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn grid_step_meters(&self) -> u32 {
        GOOGLE_GRID_STEP_METERS
    }

    fn sweep_mode(&self) -> SweepMode {
        SweepMode::Concurrent
    }

    fn coverage(&self) -> Coverage {
        Coverage::PerPoint
    }

    fn supported_languages(&self) -> &'static [Language] {
        Language::ALL
    }

    async fn fetch(
        &self,
        point: Coordinates,
        _radius_meters: u32,
        language: Language,
    ) -> Result<ProviderBatch, ProviderError> {
        let results = self
            .client
            .reverse(point, Some(language), Some(ADDRESS_RESULT_TYPES))
            .await?;

        Ok(ProviderBatch {
            candidates: results.into_iter().filter_map(to_candidate).collect(),
            upstream_calls: 1,
        })
    }
}
