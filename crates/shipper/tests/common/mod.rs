//! Common test utilities for shipper integration tests.
//!
//! Provides a scripted in-memory [`Transport`] so batching, retry, and
//! lifecycle behavior can be tested without a network, plus shared config
//! helpers.
//!
//! # Invariants
//! - `ScriptedTransport` replays its scripted outcomes in order; once the
//!   script is exhausted every delivery succeeds.
//! - Every delivery attempt is recorded, including failed ones.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use hec_shipper::{DeliveryError, HecAck, HecEvent, ShipperConfig, ShipperConfigBuilder, Transport};
use secrecy::SecretString;

/// A transport that replays scripted delivery outcomes.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HecAck, DeliveryError>>>,
    batches: Mutex<Vec<Vec<HecEvent>>>,
    attempts: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedTransport {
    /// Every delivery succeeds.
    pub fn always_ok() -> Self {
        Self::with_script(Vec::new())
    }

    /// Replay `script` in order, then succeed forever.
    pub fn with_script(script: Vec<Result<HecAck, DeliveryError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            batches: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Total delivery attempts made, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Successfully delivered batches, in delivery order.
    pub fn delivered_batches(&self) -> Vec<Vec<HecEvent>> {
        self.batches.lock().expect("batches lock").clone()
    }

    /// Total events across all delivered batches.
    pub fn delivered_events(&self) -> usize {
        self.delivered_batches().iter().map(Vec::len).sum()
    }
}

impl Transport for ScriptedTransport {
    async fn deliver(&self, events: &[HecEvent]) -> Result<HecAck, DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Ok(success_ack()));
        if outcome.is_ok() {
            self.batches
                .lock()
                .expect("batches lock")
                .push(events.to_vec());
        }
        outcome
    }
}

/// A standard successful HEC acknowledgment.
pub fn success_ack() -> HecAck {
    HecAck {
        code: 0,
        text: "Success".to_string(),
    }
}

/// A config builder with a test token and fast retry backoff.
#[allow(dead_code)]
pub fn test_config() -> ShipperConfigBuilder {
    ShipperConfig::builder()
        .token(SecretString::new("test-hec-token".to_string().into()))
        .retry_base_delay(std::time::Duration::from_millis(1))
        .retry_max_delay(std::time::Duration::from_millis(10))
}
