//! Splunk HEC (HTTP Event Collector) delivery client.
//!
//! This crate provides the wire-facing half of the log shipper: the event
//! payload model, a single-attempt HTTP delivery client, and the
//! transient/permanent classification of delivery outcomes that drives the
//! retry policy in `hec-shipper`.
//!
//! Retry, batching, and flush orchestration live in `hec-shipper`; this
//! crate only knows how to put one batch on the wire and say what happened.

mod client;
mod error;
mod models;
mod transport;

pub use client::{HecClient, HecClientBuilder};
pub use error::{BuildError, DeliveryError, ErrorKind, Result};
pub use models::{EventPayload, HecAck, HecEvent, HecHealth};
pub use transport::Transport;
