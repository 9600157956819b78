//! Transport seam between the shipper and the wire.
//!
//! The shipper's retry controller is written against this trait rather
//! than against `reqwest` directly, so tests can script delivery outcomes
//! without a network and alternative transports can be dropped in.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{HecAck, HecEvent};

/// One-shot batch delivery.
///
/// A transport makes exactly one delivery attempt per call and classifies
/// the outcome; it must not retry internally. Retry and backoff belong to
/// the caller.
pub trait Transport: Send + Sync + 'static {
    /// Deliver one batch, returning the collector's acknowledgment or a
    /// classified [`DeliveryError`](crate::DeliveryError).
    fn deliver(&self, events: &[HecEvent]) -> impl Future<Output = Result<HecAck>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn deliver(&self, events: &[HecEvent]) -> impl Future<Output = Result<HecAck>> + Send {
        self.as_ref().deliver(events)
    }
}
