//! Wire models for HEC event ingestion.
//!
//! # What this module handles:
//! - The per-event JSON envelope HEC expects (`time`, `host`, `source`,
//!   `sourcetype`, `index`, `event`)
//! - The `{message, meta}` event payload carried inside the envelope
//! - Acknowledgment and health-check response bodies
//!
//! # What this module does NOT handle:
//! - HTTP request construction (see [`crate::HecClient`])
//! - Mapping host-logger records into payloads (see `hec-shipper`)
//!
//! # Invariants
//! - All envelope metadata fields are optional on the wire; `None` fields
//!   are omitted entirely so the HEC token defaults apply.
//! - `EventPayload::message` may be a plain string or a structured object.

use serde::{Deserialize, Serialize};

/// The `event` body of a HEC envelope: the log message, its severity,
/// and any structured attachments (error details, splat-style extras).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// The log message. Either an opaque string or a structured object
    /// when the message was itself JSON-encoded.
    pub message: serde_json::Value,

    /// Severity level string from the host logger (e.g. "info", "error").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Structured attachments, e.g. `{"error": .., "name": .., "stack": ..}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Vec<serde_json::Value>>,
}

impl EventPayload {
    /// Create a payload carrying just a message.
    pub fn new(message: serde_json::Value) -> Self {
        Self {
            message,
            severity: None,
            meta: None,
        }
    }

    /// Set the severity level.
    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = Some(severity.into());
        self
    }

    /// Set the structured attachments.
    pub fn with_meta(mut self, meta: Vec<serde_json::Value>) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// A single wire-ready HEC event.
///
/// Serialized one-per-line (NDJSON) into the request body. Optional
/// metadata fields override the defaults configured for the HEC token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HecEvent {
    /// Event timestamp in Unix epoch seconds (decimals for sub-second
    /// precision). Omitted to let Splunk assign receipt time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,

    /// Host field (defaults to sender IP if not specified).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Source field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Sourcetype field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcetype: Option<String>,

    /// Destination index (uses the HEC token default if not specified).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// The event payload.
    pub event: EventPayload,
}

impl HecEvent {
    /// Create a new event carrying just a payload.
    pub fn new(event: EventPayload) -> Self {
        Self {
            time: None,
            host: None,
            source: None,
            sourcetype: None,
            index: None,
            event,
        }
    }

    /// Set the source field.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the sourcetype field.
    pub fn with_sourcetype(mut self, sourcetype: impl Into<String>) -> Self {
        self.sourcetype = Some(sourcetype.into());
        self
    }

    /// Set the destination index.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the host field.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the event timestamp.
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }
}

/// HEC acknowledgment for an accepted batch.
///
/// HEC returns a simple JSON body with a code and text. Code 0 indicates
/// success; non-zero codes indicate errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HecAck {
    /// Response code (0 = success, non-zero = error).
    pub code: i32,

    /// Response text (e.g., "Success" or error detail).
    pub text: String,
}

impl HecAck {
    /// Check if the acknowledgment indicates success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Get a human-readable description of the HEC response code.
    pub fn description(&self) -> String {
        match self.code {
            0 => "Success".to_string(),
            1 => "Token is required".to_string(),
            2 => "Invalid token".to_string(),
            3 => "Invalid input data format".to_string(),
            4 => "Incorrect index".to_string(),
            5 => "Data channel is missing".to_string(),
            6 => "Event field is required".to_string(),
            7 => "Acknowledgment is disabled".to_string(),
            8 => "Acknowledgment ID not found".to_string(),
            9 => "Internal server error".to_string(),
            10 => "Data channel is disabled".to_string(),
            11 => "Data channel capacity is full".to_string(),
            12 => "Indexer is busy".to_string(),
            13 => "Acknowledgment query is not supported".to_string(),
            14 => "Error in handling indexed fields".to_string(),
            15 => "Error in handling JSON fields".to_string(),
            _ => format!("Unknown error code: {}", self.code),
        }
    }
}

/// HEC health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HecHealth {
    /// Health status text (e.g., "HEC is healthy").
    pub text: String,

    /// HTTP status code from the response.
    pub code: u16,
}

impl HecHealth {
    /// Check if the health check indicates a healthy collector.
    pub fn is_healthy(&self) -> bool {
        self.code == 200 && self.text.to_lowercase().contains("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(message: &str) -> EventPayload {
        EventPayload::new(json!(message))
    }

    #[test]
    fn test_event_builder() {
        let event = HecEvent::new(payload("test"))
            .with_source("myapp")
            .with_sourcetype("json")
            .with_index("main")
            .with_host("server01")
            .with_time(1234567890.123);

        assert_eq!(event.event.message, json!("test"));
        assert_eq!(event.source, Some("myapp".to_string()));
        assert_eq!(event.sourcetype, Some("json".to_string()));
        assert_eq!(event.index, Some("main".to_string()));
        assert_eq!(event.host, Some("server01".to_string()));
        assert_eq!(event.time, Some(1234567890.123));
    }

    #[test]
    fn test_event_serialization_skips_none() {
        let event = HecEvent::new(payload("hello")).with_source("myapp");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"source\":\"myapp\""));
        assert!(json.contains("\"message\":\"hello\""));

        assert!(!json.contains("sourcetype"));
        assert!(!json.contains("index"));
        assert!(!json.contains("host"));
        assert!(!json.contains("time"));
        assert!(!json.contains("meta"));
    }

    #[test]
    fn test_structured_message_round_trip() {
        let event = HecEvent::new(
            EventPayload::new(json!({"action": "login", "user": "admin"}))
                .with_severity("error")
                .with_meta(vec![json!({"error": "boom", "name": "Error"})]),
        );

        let encoded = serde_json::to_string(&event).unwrap();
        let decoded: HecEvent = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_ack_descriptions() {
        let ok = HecAck {
            code: 0,
            text: "Success".to_string(),
        };
        assert!(ok.is_success());
        assert_eq!(ok.description(), "Success");

        let bad_token = HecAck {
            code: 2,
            text: "Invalid token".to_string(),
        };
        assert!(!bad_token.is_success());
        assert_eq!(bad_token.description(), "Invalid token");

        let unknown = HecAck {
            code: 999,
            text: "???".to_string(),
        };
        assert_eq!(unknown.description(), "Unknown error code: 999");
    }

    #[test]
    fn test_health_status() {
        let healthy = HecHealth {
            text: "HEC is healthy".to_string(),
            code: 200,
        };
        assert!(healthy.is_healthy());

        let unhealthy = HecHealth {
            text: "HEC is not available".to_string(),
            code: 503,
        };
        assert!(!unhealthy.is_healthy());
    }
}
