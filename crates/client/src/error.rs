//! Error types for HEC delivery.
//!
//! Responsibilities:
//! - Classify every delivery failure as transient (worth retrying) or
//!   permanent (retrying cannot help).
//! - Define the construction-time errors for [`crate::HecClient`].
//!
//! Does NOT handle:
//! - Retry policy or backoff (see `hec-shipper`).
//! - Batch accumulation errors (there are none; encoding never fails).
//!
//! # Invariants
//! - Network-level failures (connect, DNS, timeout) are always transient.
//! - HTTP 429 and all 5xx responses are transient.
//! - All other 4xx responses are permanent: a bad token or malformed
//!   payload does not get better by resending it.

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Whether a failed delivery attempt is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Plausibly resolved by retrying (timeout, 429, 5xx, network failure).
    Transient,
    /// Retrying cannot fix it (bad credentials, malformed request).
    Permanent,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// A failed delivery attempt, classified for the retry controller.
#[derive(Debug, Clone, Error)]
#[error("{kind} delivery failure{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
pub struct DeliveryError {
    /// Transient or permanent classification.
    pub kind: ErrorKind,
    /// HTTP status code, when the failure came from a response.
    pub status: Option<u16>,
    /// Human-readable failure detail.
    pub message: String,
}

impl DeliveryError {
    /// A transient failure with no HTTP status (network-level).
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transient,
            status: None,
            message: message.into(),
        }
    }

    /// A permanent failure with no HTTP status.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Permanent,
            status: None,
            message: message.into(),
        }
    }

    /// Classify an HTTP error status code.
    ///
    /// - 429 and 5xx are transient.
    /// - Every other 4xx is permanent.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = if Self::is_transient_status(status) {
            ErrorKind::Transient
        } else {
            ErrorKind::Permanent
        };
        Self {
            kind,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Classify a request-level `reqwest` failure.
    ///
    /// Connection refused, DNS failure, and request timeout all land here
    /// and are all transient.
    pub fn from_request(err: reqwest::Error) -> Self {
        Self {
            kind: ErrorKind::Transient,
            status: None,
            message: err.to_string(),
        }
    }

    /// Check whether this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::Transient
    }

    /// Check if an HTTP status code indicates a transient failure.
    pub fn is_transient_status(status: u16) -> bool {
        status == 429 || (500..600).contains(&status)
    }
}

/// Errors that can occur while constructing a [`crate::HecClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// No HEC URL was provided to the builder.
    #[error("HEC url is required")]
    MissingUrl,

    /// No HEC token was provided to the builder.
    #[error("HEC token is required")]
    MissingToken,

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_status_classification() {
        assert!(DeliveryError::is_transient_status(429));
        assert!(DeliveryError::is_transient_status(500));
        assert!(DeliveryError::is_transient_status(503));
        assert!(DeliveryError::is_transient_status(599));

        assert!(!DeliveryError::is_transient_status(400));
        assert!(!DeliveryError::is_transient_status(401));
        assert!(!DeliveryError::is_transient_status(403));
        assert!(!DeliveryError::is_transient_status(404));
        assert!(!DeliveryError::is_transient_status(200));
    }

    #[test]
    fn test_from_status_kinds() {
        assert!(DeliveryError::from_status(503, "busy").is_transient());
        assert!(DeliveryError::from_status(429, "slow down").is_transient());
        assert!(!DeliveryError::from_status(403, "invalid token").is_transient());
    }

    #[test]
    fn test_display_includes_status() {
        let err = DeliveryError::from_status(403, "invalid token");
        let rendered = err.to_string();
        assert!(rendered.contains("permanent"));
        assert!(rendered.contains("403"));
        assert!(rendered.contains("invalid token"));

        let err = DeliveryError::transient("connection refused");
        assert!(!err.to_string().contains("HTTP"));
    }
}
