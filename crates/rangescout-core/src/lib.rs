pub mod app_config;
pub mod config;
pub mod geo;
pub mod language;
pub mod provider;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::Coordinates;
pub use language::{CountryCode, Language};
pub use provider::ProviderKind;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("coordinates out of range: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("invalid ISO-3166-1 alpha-2 country code: \"{0}\"")]
    InvalidCountryCode(String),

    #[error("unsupported language: \"{0}\"")]
    UnknownLanguage(String),

    #[error("unknown provider kind: \"{0}\"")]
    UnknownProvider(String),
}
