//! Batch accumulation with count and byte-size bounds.
//!
//! # What this module handles:
//! - Buffering encoded events alongside their completion channels
//! - Incremental byte accounting of the NDJSON wire encoding
//! - Sealing a batch when a count or size bound trips
//!
//! # What this module does NOT handle:
//! - Timer-driven flushes (the shipper worker owns the interval)
//! - Delivery or retries
//!
//! # Invariants
//! - A sealed batch holds at most `max_count` events and at most
//!   `max_size` bytes, with one exception: a single event larger than
//!   `max_size` seals alone as a singleton batch rather than being
//!   dropped.
//! - Events and completions stay index-aligned within a batch.

use std::collections::VecDeque;
use std::time::Instant;

use tokio::sync::oneshot;

use crate::error::ShipError;
use hec_client::HecEvent;

/// Completion channel resolving a [`Receipt`](crate::Receipt) when the
/// containing batch reaches a terminal state.
pub(crate) type Completion = oneshot::Sender<Result<(), ShipError>>;

/// An ordered group of events sealed for delivery as one request.
pub(crate) struct Batch {
    /// Events in submission order.
    pub events: Vec<HecEvent>,
    /// One completion per event, index-aligned with `events`.
    pub completions: Vec<Completion>,
    /// NDJSON-encoded size of the batch in bytes.
    pub byte_size: usize,
    /// When the first event was appended.
    pub created_at: Instant,
}

impl Batch {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            completions: Vec::new(),
            byte_size: 0,
            created_at: Instant::now(),
        }
    }

    fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Buffers events into the open batch and seals on bound trips.
pub(crate) struct BatchAccumulator {
    max_count: usize,
    max_size: usize,
    open: Batch,
}

impl BatchAccumulator {
    pub fn new(max_count: usize, max_size: usize) -> Self {
        Self {
            max_count,
            max_size,
            open: Batch::new(),
        }
    }

    /// Append an event, returning any batches sealed as a result.
    ///
    /// Appending an event that would push the open batch past its size
    /// bound seals the open batch first; the event then starts a fresh
    /// one. Reaching either bound seals immediately, so an event larger
    /// than `max_size` seals alone.
    pub fn append(&mut self, event: HecEvent, completion: Completion) -> VecDeque<Batch> {
        let mut sealed = VecDeque::new();
        let line_len = encoded_len(&event);

        if !self.open.is_empty() && self.open.byte_size + 1 + line_len > self.max_size {
            sealed.push_back(self.seal());
        }

        // Newline separator for every event after the first.
        let separator = usize::from(!self.open.is_empty());
        self.open.byte_size += separator + line_len;
        self.open.events.push(event);
        self.open.completions.push(completion);

        if self.open.events.len() >= self.max_count || self.open.byte_size >= self.max_size {
            sealed.push_back(self.seal());
        }
        sealed
    }

    /// Force-seal the open batch regardless of fill level. Returns `None`
    /// when there is nothing buffered.
    pub fn take(&mut self) -> Option<Batch> {
        if self.open.is_empty() {
            None
        } else {
            Some(self.seal())
        }
    }

    /// Check whether anything is buffered.
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    fn seal(&mut self) -> Batch {
        std::mem::replace(&mut self.open, Batch::new())
    }
}

/// NDJSON line length of one event.
fn encoded_len(event: &HecEvent) -> usize {
    // HecEvent serialization cannot fail: keys are strings and values are
    // already valid JSON.
    serde_json::to_vec(event).map(|b| b.len()).unwrap_or(0)
}
