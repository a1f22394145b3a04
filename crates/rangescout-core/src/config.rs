use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, Language};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("RANGESCOUT_ENV", "development"))?;

    let bind_addr = or_default("RANGESCOUT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("RANGESCOUT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("RANGESCOUT_LOG_LEVEL", "info");

    let google_maps_api_key = optional("GOOGLE_MAPS_API_KEY");
    let here_api_key = optional("HERE_API_KEY");
    // The place resolver is Google-backed.
    if env == Environment::Production && google_maps_api_key.is_none() {
        return Err(ConfigError::MissingEnvVar("GOOGLE_MAPS_API_KEY".to_string()));
    }

    let default_language = or_default("RANGESCOUT_DEFAULT_LANGUAGE", "de")
        .parse::<Language>()
        .map_err(|e| invalid("RANGESCOUT_DEFAULT_LANGUAGE", e.to_string()))?;

    let max_radius_meters = parse_u32("RANGESCOUT_MAX_RADIUS_METERS", "5000")?;
    if max_radius_meters == 0 {
        return Err(invalid(
            "RANGESCOUT_MAX_RADIUS_METERS",
            "must be at least 1".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("RANGESCOUT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("RANGESCOUT_USER_AGENT", "rangescout/0.1 (address-discovery)");
    let max_concurrent_fetches = parse_usize("RANGESCOUT_MAX_CONCURRENT_FETCHES", "8")?.max(1);
    let here_requests_per_minute = parse_u32("RANGESCOUT_HERE_REQUESTS_PER_MINUTE", "300")?.max(1);
    let max_retries = parse_u32("RANGESCOUT_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("RANGESCOUT_RETRY_BACKOFF_BASE_MS", "500")?;
    let sweep_timeout_secs = parse_u64("RANGESCOUT_SWEEP_TIMEOUT_SECS", "0")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        google_maps_api_key,
        here_api_key,
        default_language,
        max_radius_meters,
        request_timeout_secs,
        user_agent,
        max_concurrent_fetches,
        here_requests_per_minute,
        max_retries,
        retry_backoff_base_ms,
        sweep_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RANGESCOUT_ENV".to_string(),
            reason: format!("expected development, test or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
