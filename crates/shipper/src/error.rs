//! Error types for shipper construction and delivery outcomes.
//!
//! Responsibilities:
//! - Fail-fast configuration errors (missing token, bad URL).
//! - The per-batch terminal failure surfaced through receipts.
//! - Lifecycle errors for a closed shipper.
//!
//! Does NOT handle:
//! - Transient/permanent classification (see `hec_client::DeliveryError`).
//!
//! Invariants:
//! - Configuration errors are reported synchronously at construction,
//!   never from the delivery path.
//! - `ShipError` is `Clone` so every event in an abandoned batch receives
//!   the same failure through its receipt.

use hec_client::DeliveryError;
use thiserror::Error;

/// Errors detected while validating a [`ShipperConfig`](crate::ShipperConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No HEC token was provided, or it was empty.
    #[error("HEC token is required")]
    MissingToken,

    /// The collector URL did not parse.
    #[error("invalid HEC url: {0}")]
    InvalidUrl(String),

    /// A numeric option was outside its valid range.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// The delivery client could not be constructed.
    #[error("failed to construct delivery client: {0}")]
    Client(#[from] hec_client::BuildError),
}

/// Terminal failure for a batch: retries were exhausted or the error was
/// permanent. Delivered to every affected receipt.
#[derive(Debug, Clone, Error)]
#[error("delivery abandoned after {attempts} attempt(s): {source}")]
pub struct ShipError {
    /// Number of delivery attempts made before giving up.
    pub attempts: usize,

    /// The last delivery error observed.
    #[source]
    pub source: DeliveryError,
}

/// Lifecycle errors from the [`Shipper`](crate::Shipper) handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShipperError {
    /// The shipper has been closed; no further operations are accepted.
    #[error("shipper is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ship_error_display() {
        let err = ShipError {
            attempts: 3,
            source: DeliveryError::from_status(503, "busy"),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("3 attempt(s)"));
        assert!(rendered.contains("503"));
    }
}
