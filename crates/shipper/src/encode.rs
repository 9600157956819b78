//! Event encoder: host logger records into wire-ready HEC events.
//!
//! # What this module handles:
//! - The structural [`LogRecord`] contract the host logger fills in
//! - Best-effort promotion of JSON-encoded message strings into
//!   structured objects
//! - Applying the configured source/sourcetype/index metadata
//!
//! # What this module does NOT handle:
//! - Level filtering or message formatting (host framework concerns)
//! - Batch accumulation (see `batch`)
//!
//! # Invariants
//! - Encoding never fails: a message that does not parse as JSON stays an
//!   opaque string, unchanged.
//! - Only recognized fields are interpreted; `meta` entries pass through
//!   opaquely.

use serde_json::{Value, json};

use crate::config::ShipperConfig;
use hec_client::{EventPayload, HecEvent};

/// A single record handed over by the host logging framework.
///
/// Structural contract: a message, a severity level, and an open-ended
/// metadata bag. Anything the host attaches via `meta` is forwarded
/// opaquely inside the event payload.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// The log message. May itself be a JSON-encoded string, in which
    /// case it is promoted to a structured object on encode.
    pub message: String,

    /// Severity level string (e.g. "info", "error").
    pub level: String,

    /// Structured attachments forwarded opaquely to the collector.
    pub meta: Vec<Value>,

    /// Event timestamp in Unix epoch seconds; `None` lets Splunk assign
    /// receipt time.
    pub time: Option<f64>,

    /// Originating host; `None` lets the collector default to sender IP.
    pub host: Option<String>,
}

impl LogRecord {
    /// Create a record with a level and message.
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: level.into(),
            meta: Vec::new(),
            time: None,
            host: None,
        }
    }

    /// Attach an opaque metadata value.
    pub fn with_meta(mut self, value: Value) -> Self {
        self.meta.push(value);
        self
    }

    /// Attach error detail in the conventional `{error, name, stack}` shape.
    pub fn with_error(self, name: &str, message: &str, stack: Option<&str>) -> Self {
        let mut detail = json!({
            "error": message,
            "name": name,
        });
        if let (Some(obj), Some(stack)) = (detail.as_object_mut(), stack) {
            obj.insert("stack".to_string(), json!(stack));
        }
        self.with_meta(detail)
    }

    /// Set the event timestamp (Unix epoch seconds).
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the originating host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Stamp the record with the current wall-clock time.
    pub fn with_time_now(self) -> Self {
        let now = chrono::Utc::now();
        self.with_time(now.timestamp_millis() as f64 / 1000.0)
    }
}

/// Convert a host record into a wire-ready event. Never fails.
pub(crate) fn encode(record: LogRecord, config: &ShipperConfig) -> HecEvent {
    let message = match parse_structured(&record.message) {
        Some(structured) => structured,
        None => Value::String(record.message),
    };

    let mut payload = EventPayload::new(message).with_severity(record.level);
    if !record.meta.is_empty() {
        payload = payload.with_meta(record.meta);
    }

    let mut event = HecEvent::new(payload)
        .with_source(config.source.clone())
        .with_sourcetype(config.sourcetype.clone());
    if let Some(index) = &config.index {
        event = event.with_index(index.clone());
    }
    if let Some(time) = record.time {
        event = event.with_time(time);
    }
    if let Some(host) = record.host {
        event = event.with_host(host);
    }
    event
}

/// Best-effort parse of a JSON-encoded message string.
///
/// Only objects are promoted; scalars and arrays stay opaque strings so a
/// message like `"42"` or `"true"` is not silently retyped.
fn parse_structured(raw: &str) -> Option<Value> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str::<Value>(trimmed)
        .ok()
        .filter(Value::is_object)
}
