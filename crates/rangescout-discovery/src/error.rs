use rangescout_core::ProviderKind;
use thiserror::Error;

/// Failures that escape [`crate::RangeDiscovery::discover`].
///
/// Per-point provider failures never appear here; they are logged and the
/// sweep continues.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The source location could not be resolved to coordinates plus address
    /// components.
    #[error("place not found: {reason}")]
    PlaceNotFound { reason: String },

    /// The grid around the source holds no point besides the source itself.
    #[error(
        "radius of {radius_meters} m yields no grid points beyond the source at a {step_meters} m step"
    )]
    NoCoverage { radius_meters: u32, step_meters: u32 },

    /// The caller aborted, or the sweep deadline elapsed, before the sweep finished.
    #[error("discovery cancelled before the sweep completed")]
    Cancelled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no {0} address provider is configured")]
    ProviderUnavailable(ProviderKind),
}

/// Errors raised by an upstream geocoding call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {provider} (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: ProviderKind,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {provider} {endpoint}")]
    UnexpectedStatus {
        provider: ProviderKind,
        status: u16,
        endpoint: String,
    },

    /// The upstream answered 200 but reported a failure in its envelope.
    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: ProviderKind,
        status: String,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
