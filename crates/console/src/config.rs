use std::str::FromStr;
use std::time::Duration;

use gsb_client::poller::DEFAULT_REFRESH;
use gsb_core::ops::query::DEFAULT_LIMIT_RUNS;

use crate::cli::GlobalArgs;

/// Service used when `GSB_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// A configuration value that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Console configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Catalog/execution service base URL.
    pub base_url: String,
    /// Interval between ops refreshes.
    pub refresh: Duration,
    /// Run page size when the query string does not set `limit_runs`.
    pub default_limit_runs: u32,
    /// Per-request timeout; `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh: DEFAULT_REFRESH,
            default_limit_runs: DEFAULT_LIMIT_RUNS,
            request_timeout: None,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `GSB_BASE_URL`             | `http://localhost:8000` |
    /// | `GSB_REFRESH_MS`           | `15000`                 |
    /// | `GSB_DEFAULT_LIMIT_RUNS`   | `25`                    |
    /// | `GSB_REQUEST_TIMEOUT_SECS` | unset                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("GSB_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let refresh = positive::<u64, _>(&lookup, "GSB_REFRESH_MS", "a positive number of milliseconds")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.refresh);

        let default_limit_runs =
            positive::<u32, _>(&lookup, "GSB_DEFAULT_LIMIT_RUNS", "a positive integer")?
                .unwrap_or(defaults.default_limit_runs);

        let request_timeout =
            positive::<u64, _>(&lookup, "GSB_REQUEST_TIMEOUT_SECS", "a positive number of seconds")?
                .map(Duration::from_secs);

        Ok(Self {
            base_url,
            refresh,
            default_limit_runs,
            request_timeout,
        })
    }

    /// Apply command-line flags on top of the environment.
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(ms) = args.refresh_ms {
            self.refresh = Duration::from_millis(ms);
        }
        if let Some(limit) = args.limit_runs {
            self.default_limit_runs = limit;
        }
        if let Some(secs) = args.timeout_secs {
            self.request_timeout = Some(Duration::from_secs(secs));
        }
        self
    }
}

/// Read a number that must be at least 1. Unset or blank is `None`.
fn positive<T, F>(lookup: &F, var: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd + From<u8>,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<T>() {
        Ok(value) if value >= T::from(1) => Ok(Some(value)),
        _ => Err(ConfigError {
            var,
            value: raw,
            expected,
        }),
    }
}
