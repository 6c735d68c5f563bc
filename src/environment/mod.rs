//! # Harness configuration
//!
//! The base URL of the target server, the per-request timeout, worker
//! concurrency and `{{variable}}` overrides. Built once per run, validated,
//! then shared read-only.

use reqwest::Url;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CONCURRENCY: usize = 4;
const DATA_DIR: &str = ".petstore-contract";
const HISTORY_FILE: &str = "history.db";

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub base_url: Url,
    pub timeout_ms: u64,
    pub concurrency: usize,
    /// Overrides for path placeholders, e.g. a username seeded on the target.
    pub variables: BTreeMap<String, String>,
}

impl HarnessConfig {
    pub fn new(
        base_url: Option<&str>,
        timeout_ms: u64,
        concurrency: usize,
        raw_variables: &[String],
    ) -> Result<Self, ConfigError> {
        let raw_url = base_url
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let base_url = parse_base_url(raw_url)?;

        if timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let mut variables = BTreeMap::new();
        for raw in raw_variables {
            let (key, value) = parse_variable(raw)?;
            variables.insert(key, value);
        }

        Ok(Self {
            base_url,
            timeout_ms,
            concurrency,
            variables,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "query and fragment are not allowed".to_string(),
        });
    }

    Ok(url)
}

/// Parse one `key=value` override.
pub fn parse_variable(raw: &str) -> Result<(String, String), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidVariable(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidVariable(raw.to_string()));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Default history database location under the working directory.
pub fn default_history_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DATA_DIR)
        .join(HISTORY_FILE)
}

/// Interpolate `{{key}}` placeholders in a string using the provided variable map.
pub fn interpolate(input: &str, variables: &BTreeMap<String, String>) -> String {
    let mut result = input.to_string();
    for (key, value) in variables {
        result = result.replace(&format!("{{{{{key}}}}}"), value);
    }
    result
}

/// Merge case defaults with run-wide overrides. Overrides win.
pub fn build_variable_map(
    case_variables: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut variables = case_variables.clone();
    for (key, value) in overrides {
        if !key.is_empty() {
            variables.insert(key.clone(), value.clone());
        }
    }
    variables
}
