//! HTTP delivery client for the Splunk HTTP Event Collector.
//!
//! This module is responsible for:
//! - Building the underlying HTTP client (timeout, TLS verification)
//! - Serializing a batch into the NDJSON body HEC accepts
//! - Issuing exactly one POST per [`Transport::deliver`] call
//! - Classifying the HTTP outcome as success, transient, or permanent
//!
//! # What this module does NOT handle:
//! - Retry or backoff (the shipper's retry controller owns that)
//! - Batch accumulation or flush timing
//!
//! # Authentication
//! HEC uses `Authorization: Splunk <token>` (not `Bearer`). The token is
//! held in a [`SecretString`] and only exposed at header-construction time.
//!
//! # Invariants
//! - All requests use JSON content type; bodies are newline-delimited
//!   event objects.
//! - The base URL is normalized to have no trailing slashes.
//! - A 2xx response is always an acknowledgment, even when the body does
//!   not parse: ingestion succeeded at the HTTP layer.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{BuildError, DeliveryError, Result};
use crate::models::{HecAck, HecEvent, HecHealth};
use crate::transport::Transport;

/// Default HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Delivery client for a single HEC endpoint.
///
/// Cheap to clone; the underlying `reqwest::Client` is reference-counted.
///
/// # Example
///
/// ```rust,ignore
/// use hec_client::HecClient;
/// use secrecy::SecretString;
///
/// let client = HecClient::builder()
///     .url("https://localhost:8088".to_string())
///     .token(SecretString::new("my-hec-token".to_string().into()))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct HecClient {
    http: reqwest::Client,
    url: String,
    token: SecretString,
}

impl HecClient {
    /// Create a builder with default settings.
    pub fn builder() -> HecClientBuilder {
        HecClientBuilder::new()
    }

    /// The normalized collector base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn auth_header(&self) -> String {
        format!("Splunk {}", self.token.expose_secret())
    }

    /// Serialize a batch as newline-delimited JSON, one event per line.
    fn ndjson_body(events: &[HecEvent]) -> Result<String> {
        let lines = events
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DeliveryError::permanent(format!("failed to serialize event: {e}")))?;
        Ok(lines.join("\n"))
    }

    /// Check the collector's health endpoint.
    ///
    /// Lets a host application probe shipping health independently of
    /// event delivery.
    ///
    /// # Errors
    /// Returns a transient [`DeliveryError`] if the request cannot be made.
    pub async fn health_check(&self) -> Result<HecHealth> {
        let url = format!("{}/services/collector/health", self.url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(DeliveryError::from_request)?;

        let code = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read health response body".to_string());

        Ok(HecHealth {
            text: text.trim().to_string(),
            code,
        })
    }
}

impl Transport for HecClient {
    /// Make one delivery attempt against `/services/collector/event`.
    ///
    /// Outcome classification:
    /// - 2xx: acknowledged (body parsed as [`HecAck`] when possible)
    /// - network failure or timeout: transient
    /// - 429 / 5xx: transient
    /// - other 4xx: permanent
    async fn deliver(&self, events: &[HecEvent]) -> Result<HecAck> {
        let url = format!("{}/services/collector/event", self.url);
        let body = Self::ndjson_body(events)?;

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(DeliveryError::from_request)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read response body".to_string());

        if (200..300).contains(&status) {
            // Prefer the collector's own ack body for the code/text detail.
            let ack = serde_json::from_str::<HecAck>(&body).unwrap_or(HecAck {
                code: 0,
                text: body.trim().to_string(),
            });
            tracing::debug!(status, code = ack.code, "batch accepted by collector");
            return Ok(ack);
        }

        // Surface the collector's error text when the body parses as an ack.
        let message = match serde_json::from_str::<HecAck>(&body) {
            Ok(ack) => format!("{} ({})", ack.text, ack.description()),
            Err(_) => body,
        };
        Err(DeliveryError::from_status(status, message))
    }
}

/// Builder for creating a new [`HecClient`].
///
/// `url` and `token` are required; everything else has defaults.
pub struct HecClientBuilder {
    url: Option<String>,
    token: Option<SecretString>,
    timeout: Duration,
    skip_verify: bool,
}

impl Default for HecClientBuilder {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            skip_verify: false,
        }
    }
}

impl HecClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collector base URL, e.g. `https://localhost:8088`.
    /// Trailing slashes are removed.
    pub fn url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    /// Set the HEC authentication token.
    pub fn token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the per-request timeout. Expiry is treated as a transient
    /// delivery failure. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// # Security Warning
    /// Only use this in development or testing environments.
    ///
    /// # Note
    /// This only affects HTTPS connections. For HTTP URLs, a warning is
    /// logged but no error occurs.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Normalize a base URL by removing trailing slashes.
    ///
    /// This prevents double slashes when concatenating with the collector
    /// path.
    fn normalize_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Build the [`HecClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingUrl`] or [`BuildError::MissingToken`]
    /// when a required field was not provided, and [`BuildError::Http`]
    /// if the HTTP client fails to build.
    pub fn build(self) -> std::result::Result<HecClient, BuildError> {
        let url = self.url.ok_or(BuildError::MissingUrl)?;
        let url = Self::normalize_url(url);

        let token = self.token.ok_or(BuildError::MissingToken)?;

        let mut http_builder = reqwest::Client::builder().timeout(self.timeout);

        if self.skip_verify {
            if url.starts_with("https://") {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                // skip_verify only affects TLS certificate verification.
                // It has no effect on HTTP connections since there is no TLS layer.
                tracing::warn!(
                    "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
                );
            }
        }

        let http = http_builder.build()?;

        Ok(HecClient { http, url, token })
    }
}
