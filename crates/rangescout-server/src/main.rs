mod api;
mod middleware;

use std::sync::Arc;

use anyhow::Context;
use rangescout_discovery::{
    ClientSettings, DiscoverySettings, GoogleAddressProvider, GoogleGeocodingClient,
    HereAddressProvider, RangeDiscovery,
};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = rangescout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let discovery = build_discovery(&config)?;
    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        providers = ?discovery.provider_kinds(),
        "starting rangescout server"
    );

    let app = build_app(AppState {
        discovery: Arc::new(discovery),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wires the Google resolver plus every provider that has an API key.
fn build_discovery(config: &rangescout_core::AppConfig) -> anyhow::Result<RangeDiscovery> {
    let google_key = config
        .google_maps_api_key
        .as_deref()
        .context("GOOGLE_MAPS_API_KEY is required: place resolution is Google-backed")?;

    let client_settings = ClientSettings::from_app_config(config);
    let google = Arc::new(GoogleGeocodingClient::new(google_key, &client_settings)?);

    let mut discovery =
        RangeDiscovery::new(google.clone(), DiscoverySettings::from_app_config(config))
            .with_provider(Arc::new(GoogleAddressProvider::new(google)));

    match config.here_api_key.as_deref() {
        Some(here_key) => {
            let here = HereAddressProvider::new(
                here_key,
                &client_settings,
                config.here_requests_per_minute,
            )?;
            discovery = discovery.with_provider(Arc::new(here));
        }
        None => tracing::warn!("HERE_API_KEY not set; HERE sweeps are disabled"),
    }

    Ok(discovery)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
