//! `discover` subcommand: one live sweep against the configured providers.

use std::sync::Arc;

use anyhow::Context;
use rangescout_core::{AppConfig, Coordinates, CountryCode, Language, ProviderKind};
use rangescout_discovery::{
    ClientSettings, DiscoverySettings, GoogleAddressProvider, GoogleGeocodingClient,
    HereAddressProvider, Location, RangeDiscovery, RequestContext,
};

pub(crate) fn source_location(
    lat: Option<f64>,
    lng: Option<f64>,
    address: Option<String>,
) -> anyhow::Result<Location> {
    match (lat, lng, address) {
        (Some(lat), Some(lng), None) => Ok(Location::Coordinates(Coordinates::new(lat, lng)?)),
        (None, None, Some(address)) => Ok(Location::Address(address)),
        _ => anyhow::bail!("pass either --lat and --lng, or --address"),
    }
}

fn build_discovery(config: &AppConfig, provider: ProviderKind) -> anyhow::Result<RangeDiscovery> {
    let google_key = config
        .google_maps_api_key
        .as_deref()
        .context("GOOGLE_MAPS_API_KEY is required to resolve the source place")?;

    let client_settings = ClientSettings::from_app_config(config);
    let google = Arc::new(
        GoogleGeocodingClient::new(google_key, &client_settings)
            .map_err(|e| anyhow::anyhow!("failed to build Google client: {e}"))?,
    );
    let discovery = RangeDiscovery::new(google.clone(), DiscoverySettings::from_app_config(config));

    let discovery = match provider {
        ProviderKind::Google => discovery.with_provider(Arc::new(GoogleAddressProvider::new(google))),
        ProviderKind::Here => {
            let here_key = config
                .here_api_key
                .as_deref()
                .context("HERE_API_KEY is required for --provider here")?;
            let here = HereAddressProvider::new(
                here_key,
                &client_settings,
                config.here_requests_per_minute,
            )
            .map_err(|e| anyhow::anyhow!("failed to build HERE client: {e}"))?;
            discovery.with_provider(Arc::new(here))
        }
    };
    Ok(discovery)
}

/// Runs one discovery and prints the report as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if configuration is incomplete for `provider`, the request
/// is invalid, or the discovery fails terminally.
pub(crate) async fn run_discover(
    provider: ProviderKind,
    location: Location,
    radius_meters: u32,
    countries: Vec<CountryCode>,
    language: Option<Language>,
) -> anyhow::Result<()> {
    let config = rangescout_core::load_app_config()?;
    let discovery = build_discovery(&config, provider)?;

    let ctx = RequestContext::new(provider, location, radius_meters)?
        .with_allowed_countries(countries)
        .with_language_override(language);

    let report = discovery.discover(&ctx).await?;
    tracing::info!(
        %provider,
        returned = report.returned_addresses_number(),
        api_requests = report.api_requests_number(),
        "discovery complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
