mod discover;
mod grid;

use clap::{Parser, Subcommand};
use rangescout_core::{CountryCode, Language, ProviderKind};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rangescout-cli")]
#[command(about = "Discover the addresses within a radius of a place")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sweep the disc around a place and print the report as JSON.
    Discover {
        /// `google` or `here`.
        #[arg(long)]
        provider: ProviderKind,
        #[arg(long, allow_negative_numbers = true, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lng: Option<f64>,
        /// Free-text source address, instead of `--lat`/`--lng`.
        #[arg(long, conflicts_with_all = ["lat", "lng"], required_unless_present = "lat")]
        address: Option<String>,
        /// Search radius in meters.
        #[arg(long)]
        radius: u32,
        /// Restrict the source lookup to these countries. Repeatable.
        #[arg(long = "country", value_parser = parse_country)]
        countries: Vec<CountryCode>,
        #[arg(long)]
        language: Option<Language>,
    },
    /// Print the grid points a sweep would visit. Offline.
    Grid {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long)]
        radius: u32,
        #[arg(long, default_value_t = 20)]
        step: u32,
    },
}

fn parse_country(raw: &str) -> Result<CountryCode, String> {
    CountryCode::new(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Discover {
            provider,
            lat,
            lng,
            address,
            radius,
            countries,
            language,
        } => {
            let location = discover::source_location(lat, lng, address)?;
            discover::run_discover(provider, location, radius, countries, language).await
        }
        Commands::Grid {
            lat,
            lng,
            radius,
            step,
        } => grid::run_grid(lat, lng, radius, step),
    }
}
