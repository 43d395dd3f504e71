use reqwest::Url;

use crate::app_config::{AppConfig, Environment, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; the lookup indirection keeps the parsing
/// testable with a plain `HashMap` instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("GUNDEALS_ENV", "development"));
    let log_level = or_default("GUNDEALS_LOG_LEVEL", "info");
    let site_url = parse_site_url(&or_default("GUNDEALS_SITE_URL", "https://gun.deals"))?;
    let link_domain = or_default("DOMAIN", "localhost:8080");

    let request_timeout_secs = parse_u64("GUNDEALS_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GUNDEALS_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let connect_timeout_secs = parse_u64("GUNDEALS_CONNECT_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("GUNDEALS_USER_AGENT", DEFAULT_USER_AGENT);
    let min_request_delay_ms = parse_u64("GUNDEALS_MIN_REQUEST_DELAY_MS", "0")?;
    let random_delay_ms = parse_u64("GUNDEALS_RANDOM_DELAY_MS", "2000")?;

    Ok(AppConfig {
        env,
        log_level,
        site_url,
        link_domain,
        request_timeout_secs,
        connect_timeout_secs,
        user_agent,
        min_request_delay_ms,
        random_delay_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_site_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "GUNDEALS_SITE_URL".to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme \"{}\" (expected http or https)",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid("URL has no host".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
