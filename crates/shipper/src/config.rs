//! Shipper configuration snapshot and its validating builder.
//!
//! This module is responsible for:
//! - Centralizing every tunable of the shipper with its default value
//! - Validating required fields (token) and value ranges at build time
//! - Holding the token in a [`SecretString`] so it never leaks via Debug
//!
//! # What this module does NOT handle:
//! - Loading configuration from files or the environment (the host
//!   application constructs the snapshot and injects it)
//! - Runtime mutation: the snapshot is immutable once built; shutdown is
//!   an explicit shipper state transition, not a config flip
//!
//! # Invariants
//! - `token` is required and non-empty; everything else has a default.
//! - `max_batch_count` and `max_batch_size` are at least 1.
//! - A `batch_interval` of zero disables the timer and seals a batch on
//!   every appended event.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Default collector URL.
pub const DEFAULT_URL: &str = "https://localhost:8088";

/// Default "source" metadata applied to every event.
pub const DEFAULT_SOURCE: &str = "app";

/// Default "sourcetype" metadata applied to every event.
pub const DEFAULT_SOURCETYPE: &str = "generic-http";

/// Default interval between timer-driven flushes, in milliseconds.
pub const DEFAULT_BATCH_INTERVAL_MS: u64 = 1000;

/// Default maximum number of events per batch.
pub const DEFAULT_MAX_BATCH_COUNT: usize = 10;

/// Default maximum batch size in bytes.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1024;

/// Default number of retries for a transiently failing batch.
pub const DEFAULT_MAX_RETRIES: usize = 10;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default base delay for exponential retry backoff, in milliseconds.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Default cap on the retry backoff delay, in seconds.
pub const DEFAULT_RETRY_MAX_DELAY_SECS: u64 = 60;

/// Immutable configuration snapshot for one [`Shipper`](crate::Shipper).
#[derive(Debug, Clone)]
pub struct ShipperConfig {
    /// HEC authentication token (required).
    pub token: SecretString,

    /// Collector base URL.
    pub url: String,

    /// "source" metadata applied to every event.
    pub source: String,

    /// "sourcetype" metadata applied to every event.
    pub sourcetype: String,

    /// Destination index; `None` uses the HEC token default.
    pub index: Option<String>,

    /// Interval between timer-driven flushes. Zero disables the timer and
    /// seals a batch after every event.
    pub batch_interval: Duration,

    /// Maximum number of events per batch.
    pub max_batch_count: usize,

    /// Maximum batch size in bytes. A single larger event still ships as
    /// a singleton batch.
    pub max_batch_size: usize,

    /// Retries per batch after the first attempt. Zero means exactly one
    /// attempt.
    pub max_retries: usize,

    /// Suppress the warning log on abandoned deliveries. Receipts are
    /// always completed regardless.
    pub silent_errors: bool,

    /// Per-request HTTP timeout; expiry counts as a transient failure.
    pub timeout: Duration,

    /// Skip TLS certificate verification (development only).
    pub skip_verify: bool,

    /// Base delay for exponential retry backoff.
    pub retry_base_delay: Duration,

    /// Cap on the retry backoff delay.
    pub retry_max_delay: Duration,
}

impl ShipperConfig {
    /// Create a builder with default settings.
    pub fn builder() -> ShipperConfigBuilder {
        ShipperConfigBuilder::new()
    }
}

/// Builder for [`ShipperConfig`]. Only `token` is required.
pub struct ShipperConfigBuilder {
    token: Option<SecretString>,
    url: String,
    source: String,
    sourcetype: String,
    index: Option<String>,
    batch_interval: Duration,
    max_batch_count: usize,
    max_batch_size: usize,
    max_retries: usize,
    silent_errors: bool,
    timeout: Duration,
    skip_verify: bool,
    retry_base_delay: Duration,
    retry_max_delay: Duration,
}

impl Default for ShipperConfigBuilder {
    fn default() -> Self {
        Self {
            token: None,
            url: DEFAULT_URL.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            sourcetype: DEFAULT_SOURCETYPE.to_string(),
            index: None,
            batch_interval: Duration::from_millis(DEFAULT_BATCH_INTERVAL_MS),
            max_batch_count: DEFAULT_MAX_BATCH_COUNT,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            silent_errors: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            skip_verify: false,
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            retry_max_delay: Duration::from_secs(DEFAULT_RETRY_MAX_DELAY_SECS),
        }
    }
}

impl ShipperConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HEC authentication token (required).
    pub fn token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the collector base URL.
    pub fn url(mut self, url: String) -> Self {
        self.url = url;
        self
    }

    /// Set the "source" metadata for every event.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the "sourcetype" metadata for every event.
    pub fn sourcetype(mut self, sourcetype: impl Into<String>) -> Self {
        self.sourcetype = sourcetype.into();
        self
    }

    /// Set the destination index.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the interval between timer-driven flushes. Zero disables the
    /// timer and seals a batch after every event.
    pub fn batch_interval(mut self, interval: Duration) -> Self {
        self.batch_interval = interval;
        self
    }

    /// Set the maximum number of events per batch.
    pub fn max_batch_count(mut self, count: usize) -> Self {
        self.max_batch_count = count;
        self
    }

    /// Set the maximum batch size in bytes.
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    /// Set the number of retries per batch. Zero means exactly one
    /// delivery attempt.
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Suppress the warning log on abandoned deliveries.
    pub fn silent_errors(mut self, silent: bool) -> Self {
        self.silent_errors = silent;
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this in development or testing environments.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Set the base delay for exponential retry backoff.
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the cap on the retry backoff delay.
    pub fn retry_max_delay(mut self, delay: Duration) -> Self {
        self.retry_max_delay = delay;
        self
    }

    /// Build the validated [`ShipperConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when no token (or an empty
    /// token) was provided, [`ConfigError::InvalidUrl`] when the URL does
    /// not parse, and [`ConfigError::InvalidValue`] for out-of-range
    /// batch bounds.
    pub fn build(self) -> Result<ShipperConfig, ConfigError> {
        let token = self.token.ok_or(ConfigError::MissingToken)?;
        if token.expose_secret().is_empty() {
            return Err(ConfigError::MissingToken);
        }

        url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.url)))?;

        if self.max_batch_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_batch_count",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_batch_size",
                message: "must be at least 1 byte".to_string(),
            });
        }

        Ok(ShipperConfig {
            token,
            url: self.url,
            source: self.source,
            sourcetype: self.sourcetype,
            index: self.index,
            batch_interval: self.batch_interval,
            max_batch_count: self.max_batch_count,
            max_batch_size: self.max_batch_size,
            max_retries: self.max_retries,
            silent_errors: self.silent_errors,
            timeout: self.timeout,
            skip_verify: self.skip_verify,
            retry_base_delay: self.retry_base_delay,
            retry_max_delay: self.retry_max_delay,
        })
    }
}
