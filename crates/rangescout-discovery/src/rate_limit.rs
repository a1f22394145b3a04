//! Retry and pacing for upstream geocoding calls.
//!
//! [`retry_with_backoff`] retries transient failures with exponential
//! back-off and jitter. [`RequestGate`] spaces calls to a provider that
//! enforces a requests-per-minute ceiling.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ProviderError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`ProviderError::RateLimited`]: HTTP 429.
/// - [`ProviderError::Http`]: timeout, connect failure, or 5xx.
/// - [`ProviderError::UnexpectedStatus`] with a 5xx status.
/// - [`ProviderError::Api`] with `OVER_QUERY_LIMIT` or `UNKNOWN_ERROR`.
///
/// Everything else (bad keys, malformed bodies, invalid base URLs) is returned
/// immediately.
pub(crate) fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::RateLimited { .. } => true,
        ProviderError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ProviderError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ProviderError::Api { status, .. } => {
            matches!(status.as_str(), "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR")
        }
        ProviderError::Deserialize { .. } | ProviderError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt |
/// |---------|---------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter |
/// | 2       | 500 ms × 2¹ ± 25 % jitter |
/// | 3       | 500 ms × 2² ± 25 % jitter |
///
/// A 429 carrying `Retry-After` waits at least that long. Delay is capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let floor_ms = match &err {
                    ProviderError::RateLimited {
                        retry_after_secs, ..
                    } => retry_after_secs.saturating_mul(1_000),
                    _ => 0,
                };
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (computed.min(MAX_DELAY_MS) as f64
                    * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = jittered.max(floor_ms).min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient provider error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Serial pacing gate: each [`RequestGate::wait`] returns no sooner than
/// `min_gap` after the previous one.
#[derive(Debug)]
pub struct RequestGate {
    min_gap: Duration,
    last: Mutex<Option<Instant>>,
}

impl RequestGate {
    /// Gate allowing at most `requests_per_minute` calls per minute (floored at 1).
    #[must_use]
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let rpm = u64::from(requests_per_minute.max(1));
        Self {
            min_gap: Duration::from_millis(60_000 / rpm),
            last: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Waits for the next request slot.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_gap;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
