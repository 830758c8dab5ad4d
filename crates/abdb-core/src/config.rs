use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::app_config::{AppConfig, SearchProvider};
use crate::harvest::HarvestConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or a range is inverted.
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
/// Returns `ConfigError` if a value cannot be parsed or a range is inverted.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };

    let parse_num = |var: &str, default: &str| -> Result<i64, ConfigError> {
        parse_value::<i64>(var, &or_default(var, default))
    };

    let defaults = HarvestConfig::default();

    let revenue_range = (
        parse_num("ABDB_REVENUE_FROM", &defaults.revenue_range.0.to_string())?,
        parse_num("ABDB_REVENUE_TO", &defaults.revenue_range.1.to_string())?,
    );
    check_range("ABDB_REVENUE_FROM", revenue_range)?;

    let profit_range = (
        parse_num("ABDB_PROFIT_FROM", &defaults.profit_range.0.to_string())?,
        parse_num("ABDB_PROFIT_TO", &defaults.profit_range.1.to_string())?,
    );
    check_range("ABDB_PROFIT_FROM", profit_range)?;

    let page_limit = parse_value::<u32>(
        "ABDB_PAGE_LIMIT",
        &or_default("ABDB_PAGE_LIMIT", &defaults.page_limit.to_string()),
    )?;
    let request_delay_ms =
        parse_value::<u64>("ABDB_REQUEST_DELAY_MS", &or_default("ABDB_REQUEST_DELAY_MS", "500"))?;

    let harvest = HarvestConfig {
        base_url: or_default("ABDB_BASE_URL", &defaults.base_url),
        location: or_default("ABDB_LOCATION", &defaults.location),
        sort_by: or_default("ABDB_SORT_BY", &defaults.sort_by),
        page_limit,
        revenue_range,
        profit_range,
        request_delay: Duration::from_millis(request_delay_ms),
    };

    let request_timeout_secs = parse_value::<u64>(
        "ABDB_REQUEST_TIMEOUT_SECS",
        &or_default("ABDB_REQUEST_TIMEOUT_SECS", "10"),
    )?;
    let max_retries =
        parse_value::<u32>("ABDB_MAX_RETRIES", &or_default("ABDB_MAX_RETRIES", "0"))?;
    let retry_backoff_base_secs = parse_value::<u64>(
        "ABDB_RETRY_BACKOFF_BASE_SECS",
        &or_default("ABDB_RETRY_BACKOFF_BASE_SECS", "1"),
    )?;
    let detail_concurrency = parse_value::<usize>(
        "ABDB_DETAIL_CONCURRENCY",
        &or_default("ABDB_DETAIL_CONCURRENCY", "1"),
    )?;
    if detail_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ABDB_DETAIL_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let search_provider = parse_search_provider(&or_default("ABDB_SEARCH_PROVIDER", "google"))?;

    Ok(AppConfig {
        harvest,
        log_level: or_default("ABDB_LOG_LEVEL", "info"),
        data_dir: PathBuf::from(or_default("ABDB_DATA_DIR", "./data")),
        request_timeout_secs,
        user_agent: or_default("ABDB_USER_AGENT", "Mozilla/5.0"),
        max_retries,
        retry_backoff_base_secs,
        detail_concurrency,
        search_provider,
        search_api_key: optional("ABDB_SEARCH_API_KEY"),
        search_cx: optional("ABDB_SEARCH_CX"),
        search_query_suffix: or_default("ABDB_SEARCH_QUERY_SUFFIX", ""),
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn check_range(var: &str, (from, to): (i64, i64)) -> Result<(), ConfigError> {
    if from > to {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("lower bound {from} exceeds upper bound {to}"),
        });
    }
    Ok(())
}

/// Parse a search provider name (case-insensitive).
fn parse_search_provider(s: &str) -> Result<SearchProvider, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "google" => Ok(SearchProvider::Google),
        "brave" => Ok(SearchProvider::Brave),
        "duckduckgo" | "ddg" => Ok(SearchProvider::DuckDuckGo),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ABDB_SEARCH_PROVIDER".to_string(),
            reason: format!("unknown provider '{other}' (expected google, brave or duckduckgo)"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
