//! Configuration for the Iyaya API client.
//!
//! A [`ClientConfig`] carries the base URL, timeouts, and retry/cache tuning
//! for the access layer. Values come from `Default`, builder methods, or
//! environment variables (`IYAYA_API_URL`, `IYAYA_REQUEST_TIMEOUT_MS`,
//! `IYAYA_MAX_RETRIES`), in that priority order.

use std::time::Duration;

use url::Url;

/// Error types for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

impl ConfigError {
    pub fn invalid_value(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Tuning for the exponential-backoff retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the initial one. Reads use this; creates use zero.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each attempt.
    pub base_delay: Duration,
    /// Upper bound on any single backoff delay.
    pub max_delay: Duration,
    /// Whether to add random jitter (up to +50%) to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

/// TTLs for the in-memory response cache, per resource family.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL used when a façade does not pick a specific one.
    pub default_ttl: Duration,
    /// Job listings change moderately often.
    pub jobs_ttl: Duration,
    /// Caregiver search results tolerate longer staleness.
    pub caregivers_ttl: Duration,
    /// Chat polls want near-fresh data.
    pub messages_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(120),
            jobs_ttl: Duration::from_secs(120),
            caregivers_ttl: Duration::from_secs(300),
            messages_ttl: Duration::from_secs(15),
        }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub base_url: String,
    /// Deadline for a single request attempt.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Retry tuning for read operations.
    pub retry: RetryConfig,
    /// Cache TTL tuning.
    pub cache: CacheConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.iyaya.example.com/api".to_string(),
            request_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend base URL. A trailing slash is stripped.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-attempt request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the TCP connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the retry tuning.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the cache TTL tuning.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Builds a configuration from defaults plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when an override is present but unparseable.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("IYAYA_API_URL") {
            config = config.with_base_url(url);
        }
        if let Ok(raw) = std::env::var("IYAYA_REQUEST_TIMEOUT_MS") {
            let millis: u64 = raw.parse().map_err(|_| {
                ConfigError::invalid_value("IYAYA_REQUEST_TIMEOUT_MS", "expected milliseconds")
            })?;
            config.request_timeout = Duration::from_millis(millis);
        }
        if let Ok(raw) = std::env::var("IYAYA_MAX_RETRIES") {
            config.retry.max_attempts = raw.parse().map_err(|_| {
                ConfigError::invalid_value("IYAYA_MAX_RETRIES", "expected an integer")
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is not http(s) or a timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                message: "scheme must be http or https".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::invalid_value(
                "request_timeout",
                "must be nonzero",
            ));
        }
        Ok(())
    }
}
