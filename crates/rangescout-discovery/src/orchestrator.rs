//! Entry point of a range discovery: resolve, grid, sweep, aggregate.
//!
//! Per request the state moves `Resolving -> GridBuilt -> Sweeping ->
//! Aggregating -> Done`, or to `Failed` with one of the terminal
//! [`DiscoveryError`]s. Nothing is retained between requests.

use std::collections::HashMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rangescout_core::{AppConfig, Coordinates, Language, ProviderKind};

use crate::aggregate::aggregate;
use crate::error::{DiscoveryError, ProviderError};
use crate::grid::Grid;
use crate::language::resolve_language;
use crate::provider::{AddressProvider, Coverage, ProviderBatch, SweepMode};
use crate::resolver::PlaceResolver;
use crate::types::{AddressCandidate, DiscoveryReport, RequestContext, ResolvedPlace};

/// Tunables for [`RangeDiscovery`].
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Language used when neither an override nor the place's country decides.
    pub default_language: Language,
    pub max_radius_meters: u32,
    /// Worker-pool width for providers that allow concurrent fetches.
    pub max_concurrent_fetches: usize,
    /// Whole-request deadline. `None` waits for the sweep to finish.
    pub sweep_timeout: Option<Duration>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_language: Language::De,
            max_radius_meters: 5_000,
            max_concurrent_fetches: 8,
            sweep_timeout: None,
        }
    }
}

impl DiscoverySettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            default_language: config.default_language,
            max_radius_meters: config.max_radius_meters,
            max_concurrent_fetches: config.max_concurrent_fetches,
            sweep_timeout: (config.sweep_timeout_secs > 0)
                .then(|| Duration::from_secs(config.sweep_timeout_secs)),
        }
    }
}

/// Runs range discoveries against injected resolver and provider clients.
pub struct RangeDiscovery {
    resolver: Arc<dyn PlaceResolver>,
    providers: HashMap<ProviderKind, Arc<dyn AddressProvider>>,
    settings: DiscoverySettings,
}

impl RangeDiscovery {
    #[must_use]
    pub fn new(resolver: Arc<dyn PlaceResolver>, settings: DiscoverySettings) -> Self {
        Self {
            resolver,
            providers: HashMap::new(),
            settings,
        }
    }

    /// Registers `provider` under its own [`AddressProvider::kind`],
    /// replacing any provider of the same kind.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn AddressProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    #[must_use]
    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    #[must_use]
    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    /// Runs one discovery, honouring the configured sweep timeout.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::ProviderUnavailable`] if no provider of the requested
    ///   kind is registered.
    /// - [`DiscoveryError::InvalidRequest`] if the radius exceeds the configured
    ///   maximum.
    /// - [`DiscoveryError::PlaceNotFound`] if the source cannot be resolved.
    /// - [`DiscoveryError::NoCoverage`] if the grid holds only the source.
    /// - [`DiscoveryError::Cancelled`] if the sweep timeout elapses.
    pub async fn discover(&self, ctx: &RequestContext) -> Result<DiscoveryReport, DiscoveryError> {
        match self.settings.sweep_timeout {
            Some(timeout) => self.discover_until(ctx, tokio::time::sleep(timeout)).await,
            None => self.discover_until(ctx, std::future::pending::<()>()).await,
        }
    }

    /// Runs one discovery that aborts as soon as `cancel` completes.
    ///
    /// In-flight fetches are dropped and collected candidates are discarded;
    /// a partial report is never returned.
    ///
    /// # Errors
    ///
    /// As [`RangeDiscovery::discover`], with [`DiscoveryError::Cancelled`]
    /// when `cancel` wins.
    pub async fn discover_until<C>(
        &self,
        ctx: &RequestContext,
        cancel: C,
    ) -> Result<DiscoveryReport, DiscoveryError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = cancel => {
                tracing::warn!(provider = %ctx.provider(), "range discovery cancelled");
                Err(DiscoveryError::Cancelled)
            }
            result = self.run(ctx) => result,
        }
    }

    async fn run(&self, ctx: &RequestContext) -> Result<DiscoveryReport, DiscoveryError> {
        let provider = self
            .providers
            .get(&ctx.provider())
            .cloned()
            .ok_or(DiscoveryError::ProviderUnavailable(ctx.provider()))?;

        if ctx.radius_meters() > self.settings.max_radius_meters {
            return Err(DiscoveryError::InvalidRequest(format!(
                "radius {} m exceeds the maximum of {} m",
                ctx.radius_meters(),
                self.settings.max_radius_meters
            )));
        }

        tracing::debug!(provider = %ctx.provider(), state = "resolving", "range discovery started");
        let place = self.resolve_place(ctx).await?;

        let language = resolve_language(
            ctx.language_override(),
            place.country_code.as_ref(),
            provider.supported_languages(),
            self.settings.default_language,
        );

        let grid = Grid::new(
            place.coordinates,
            ctx.radius_meters(),
            provider.grid_step_meters(),
        )?;
        tracing::debug!(
            provider = %ctx.provider(),
            state = "grid_built",
            source = %place.coordinates,
            %language,
            step_meters = provider.grid_step_meters(),
            "sweeping grid"
        );

        let mut ledger = SweepLedger::new(provider.kind(), provider.coverage(), place.coordinates);
        let flow = match provider.sweep_mode() {
            SweepMode::Serial => {
                sweep_serial(provider.as_ref(), grid, ctx.radius_meters(), language, &mut ledger)
                    .await
            }
            SweepMode::Concurrent => {
                sweep_concurrent(
                    provider.as_ref(),
                    grid,
                    ctx.radius_meters(),
                    language,
                    self.settings.max_concurrent_fetches.max(1),
                    &mut ledger,
                )
                .await
            }
        };

        if flow.is_break() {
            tracing::info!(
                provider = %ctx.provider(),
                api_requests = ledger.upstream_calls,
                "provider reported an empty area, returning empty report"
            );
            return Ok(DiscoveryReport::empty(&place, ledger.upstream_calls));
        }

        tracing::debug!(
            provider = %ctx.provider(),
            state = "aggregating",
            candidates = ledger.candidates.len(),
            failed_points = ledger.failed_points,
            "sweep finished"
        );
        let addresses = aggregate(ledger.candidates, ctx.radius_meters());
        let report = DiscoveryReport::new(&place, addresses, ledger.upstream_calls);
        tracing::info!(
            provider = %ctx.provider(),
            returned = report.returned_addresses_number(),
            api_requests = report.api_requests_number(),
            "range discovery finished"
        );
        Ok(report)
    }

    async fn resolve_place(&self, ctx: &RequestContext) -> Result<ResolvedPlace, DiscoveryError> {
        let geocoded = self
            .resolver
            .resolve(
                ctx.location(),
                ctx.allowed_countries(),
                ctx.language_override(),
            )
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "place resolution failed");
                DiscoveryError::PlaceNotFound {
                    reason: e.to_string(),
                }
            })?
            .ok_or_else(|| DiscoveryError::PlaceNotFound {
                reason: "no geocoding match in the allowed countries".to_string(),
            })?;

        ResolvedPlace::from_geocoded(geocoded).ok_or_else(|| DiscoveryError::PlaceNotFound {
            reason: "resolved place lacks coordinates or address components".to_string(),
        })
    }
}

/// Running totals of one sweep.
struct SweepLedger {
    provider: ProviderKind,
    coverage: Coverage,
    source: Coordinates,
    candidates: Vec<AddressCandidate>,
    upstream_calls: u32,
    failed_points: u32,
}

impl SweepLedger {
    fn new(provider: ProviderKind, coverage: Coverage, source: Coordinates) -> Self {
        Self {
            provider,
            coverage,
            source,
            candidates: Vec::new(),
            upstream_calls: 0,
            failed_points: 0,
        }
    }

    /// Folds one point's outcome in. Breaks when a dense provider answers
    /// with nothing.
    fn record(
        &mut self,
        point: Coordinates,
        result: Result<ProviderBatch, ProviderError>,
    ) -> ControlFlow<()> {
        match result {
            Ok(batch) => {
                self.upstream_calls = self.upstream_calls.saturating_add(batch.upstream_calls);
                if self.coverage == Coverage::Dense && batch.candidates.is_empty() {
                    return ControlFlow::Break(());
                }
                let source = self.source;
                self.candidates
                    .extend(batch.candidates.into_iter().map(|c| c.measured_from(source)));
            }
            Err(e) => {
                // A failed attempt still counts as an upstream request.
                self.upstream_calls = self.upstream_calls.saturating_add(1);
                self.failed_points += 1;
                tracing::warn!(
                    provider = %self.provider,
                    point = %point,
                    error = %e,
                    "grid point fetch failed, continuing sweep"
                );
            }
        }
        ControlFlow::Continue(())
    }
}

async fn sweep_serial(
    provider: &dyn AddressProvider,
    grid: Grid,
    radius_meters: u32,
    language: Language,
    ledger: &mut SweepLedger,
) -> ControlFlow<()> {
    for point in grid {
        let result = provider.fetch(point, radius_meters, language).await;
        ledger.record(point, result)?;
    }
    ControlFlow::Continue(())
}

async fn sweep_concurrent(
    provider: &dyn AddressProvider,
    grid: Grid,
    radius_meters: u32,
    language: Language,
    max_in_flight: usize,
    ledger: &mut SweepLedger,
) -> ControlFlow<()> {
    let mut results: Vec<(usize, Coordinates, Result<ProviderBatch, ProviderError>)> =
        stream::iter(grid.enumerate())
            .map(move |(index, point)| async move {
                let result = provider.fetch(point, radius_meters, language).await;
                (index, point, result)
            })
            .buffer_unordered(max_in_flight)
            .collect()
            .await;

    // Completion order is arbitrary; fold in grid order so ties stay stable.
    results.sort_by_key(|(index, _, _)| *index);
    for (_, point, result) in results {
        ledger.record(point, result)?;
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
