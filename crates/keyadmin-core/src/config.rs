//! Configuration management for keyadmin

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable that overrides the backend base URL
pub const API_URL_ENV: &str = "KEYADMIN_API_URL";

/// Base URL used when neither an override nor a local origin is available
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://key-manager-backend.onrender.com/api";

/// Path appended to a local origin to reach the same-origin API
pub const SAME_ORIGIN_API_PATH: &str = "/api";

/// Hosts treated as a local development origin
const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// Upper bound for the liveness probe timeout
pub const MAX_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Upper bound on attempts for any retried call
pub const MAX_RETRY_ATTEMPTS: u32 = 2;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Explicit base URL override
    #[serde(default)]
    pub api_url: Option<String>,

    /// Origin the console is served from, used for same-origin `/api`
    #[serde(default)]
    pub origin: Option<String>,

    /// Default request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for proxy pool operations, which probe proxies live
    #[serde(default = "default_proxy_timeout_ms")]
    pub proxy_timeout_ms: u64,

    /// Timeout for the liveness probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Path of the liveness endpoint, relative to the base URL
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Retry policy for the liveness probe
    #[serde(default = "default_probe_retry")]
    pub probe_retry: RetryConfig,

    /// Retry policy for fallback-eligible reads
    #[serde(default = "default_read_retry")]
    pub read_retry: RetryConfig,

    /// Minimum interval before a failed backend is probed again
    #[serde(default = "default_recheck_interval_ms")]
    pub recheck_interval_ms: u64,

    /// Lower bound of the simulated latency for fallback reads
    #[serde(default = "default_fallback_delay_min_ms")]
    pub fallback_delay_min_ms: u64,

    /// Upper bound of the simulated latency for fallback reads
    #[serde(default = "default_fallback_delay_max_ms")]
    pub fallback_delay_max_ms: u64,
}

/// Bounded retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds
    pub delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
const fn default_timeout_ms() -> u64 {
    15_000
}

const fn default_proxy_timeout_ms() -> u64 {
    60_000
}

const fn default_probe_timeout_ms() -> u64 {
    MAX_PROBE_TIMEOUT_MS
}

fn default_health_path() -> String {
    "/status".to_string()
}

const fn default_probe_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: MAX_RETRY_ATTEMPTS,
        delay_ms: 2_000,
    }
}

const fn default_read_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 1,
        delay_ms: 2_000,
    }
}

const fn default_recheck_interval_ms() -> u64 {
    60_000
}

const fn default_fallback_delay_min_ms() -> u64 {
    200
}

const fn default_fallback_delay_max_ms() -> u64 {
    800
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            origin: None,
            timeout_ms: default_timeout_ms(),
            proxy_timeout_ms: default_proxy_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            health_path: default_health_path(),
            probe_retry: default_probe_retry(),
            read_retry: default_read_retry(),
            recheck_interval_ms: default_recheck_interval_ms(),
            fallback_delay_min_ms: default_fallback_delay_min_ms(),
            fallback_delay_max_ms: default_fallback_delay_max_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl RetryConfig {
    /// A policy that makes exactly one attempt
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
        }
    }

    /// Number of attempts actually made, clamped to `1..=MAX_RETRY_ATTEMPTS`
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_RETRY_ATTEMPTS)
    }

    /// Delay between attempts
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl GatewayConfig {
    /// Create a configuration pointed at an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Resolve the backend base URL
    ///
    /// Precedence: explicit override, then `<origin>/api` for a local origin,
    /// then [`DEFAULT_REMOTE_BASE_URL`].
    #[must_use]
    pub fn base_url(&self) -> String {
        resolve_base_url(self.api_url.as_deref(), self.origin.as_deref())
    }

    /// Default request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Timeout for proxy pool operations
    #[must_use]
    pub const fn proxy_timeout(&self) -> Duration {
        Duration::from_millis(self.proxy_timeout_ms)
    }

    /// Timeout for the liveness probe
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Minimum interval between probes of a failed backend
    #[must_use]
    pub const fn recheck_interval(&self) -> Duration {
        Duration::from_millis(self.recheck_interval_ms)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid setting.
    pub fn validate(&self) -> crate::Result<()> {
        if self.timeout_ms == 0 || self.proxy_timeout_ms == 0 || self.probe_timeout_ms == 0 {
            return Err(crate::Error::Configuration {
                message: "timeouts must be greater than zero".to_string(),
            });
        }
        if self.probe_timeout_ms > MAX_PROBE_TIMEOUT_MS {
            return Err(crate::Error::Configuration {
                message: format!(
                    "probe_timeout_ms must not exceed {MAX_PROBE_TIMEOUT_MS}, got {}",
                    self.probe_timeout_ms
                ),
            });
        }
        if self.fallback_delay_min_ms > self.fallback_delay_max_ms {
            return Err(crate::Error::Configuration {
                message: format!(
                    "fallback_delay_min_ms ({}) exceeds fallback_delay_max_ms ({})",
                    self.fallback_delay_min_ms, self.fallback_delay_max_ms
                ),
            });
        }
        if !self.health_path.starts_with('/') {
            return Err(crate::Error::Configuration {
                message: format!("health_path must start with '/', got {}", self.health_path),
            });
        }
        Ok(())
    }
}

/// Resolve the backend base URL from an override and the serving origin
#[must_use]
pub fn resolve_base_url(api_url: Option<&str>, origin: Option<&str>) -> String {
    if let Some(url) = api_url.map(str::trim).filter(|url| !url.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    if let Some(origin) = origin.map(str::trim)
        && is_local_origin(origin)
    {
        return format!("{}{SAME_ORIGIN_API_PATH}", origin.trim_end_matches('/'));
    }

    DEFAULT_REMOTE_BASE_URL.to_string()
}

fn is_local_origin(origin: &str) -> bool {
    url::Url::parse(origin)
        .ok()
        .as_ref()
        .and_then(url::Url::host_str)
        .is_some_and(|host| LOCAL_HOSTS.contains(&host))
}

impl Config {
    /// Load configuration from an optional `keyadmin` file and the environment
    ///
    /// Nested keys use `KEYADMIN_<SECTION>__<KEY>`, for example
    /// `KEYADMIN_GATEWAY__TIMEOUT_MS`. `KEYADMIN_API_URL` overrides the
    /// backend base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        let loaded = config::Config::builder()
            .add_source(config::File::with_name("keyadmin").required(false))
            .add_source(
                config::Environment::with_prefix("KEYADMIN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = loaded.try_deserialize()?;

        if let Ok(api_url) = std::env::var(API_URL_ENV) {
            config.gateway.api_url = Some(api_url);
        }

        config.gateway.validate()?;
        tracing::debug!(base_url = %config.gateway.base_url(), "configuration loaded");
        Ok(config)
    }
}
