//! Batching log shipper for the Splunk HTTP Event Collector.
//!
//! This crate adapts a host logging framework's per-record call into
//! batched HEC deliveries: records are encoded into wire events,
//! accumulated until a count, byte-size, or interval trigger seals the
//! batch, and delivered through `hec-client` with bounded retries.
//! Delivery outcomes flow back through awaitable [`Receipt`]s so the
//! logging call site never blocks on the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use hec_shipper::{LogRecord, Shipper, ShipperConfig};
//! use secrecy::SecretString;
//!
//! let config = ShipperConfig::builder()
//!     .token(SecretString::new("my-hec-token".to_string().into()))
//!     .url("https://splunk.example.com:8088".to_string())
//!     .build()?;
//!
//! let shipper = Shipper::new(config)?;
//! let receipt = shipper.send(LogRecord::new("info", "hello splunk"))?;
//! receipt.wait().await?;
//! shipper.close().await?;
//! ```
//!
//! Delivery is at-least-once and best-effort: nothing is persisted across
//! process restarts, and ordering is only guaranteed within a batch.

mod batch;
mod config;
mod encode;
mod error;
pub mod retry;
mod shipper;

pub use config::{ShipperConfig, ShipperConfigBuilder};
pub use encode::LogRecord;
pub use error::{ConfigError, ShipError, ShipperError};
pub use retry::RetryPolicy;
pub use shipper::{Receipt, Shipper};

// Wire-level types callers need when implementing their own transport.
pub use hec_client::{
    DeliveryError, ErrorKind, EventPayload, HecAck, HecClient, HecEvent, Transport,
};
