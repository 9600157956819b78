//! Shipper orchestration: the host-logger-facing contract.
//!
//! # What this module handles:
//! - The cloneable [`Shipper`] handle with `send`/`flush`/`close`
//! - The worker task owning the accumulator, interval timer, and the
//!   FIFO queue of sealed batches
//! - Pipelining: at most one batch in flight while accumulation continues
//! - Completing receipts and flush/close waiters
//!
//! # What this module does NOT handle:
//! - Wire delivery and outcome classification (see `hec-client`)
//! - Backoff shape (see [`crate::retry`])
//!
//! # Invariants
//! - `send` never blocks: encoding is synchronous and cheap, everything
//!   else crosses an unbounded channel to the worker.
//! - Every accepted event reaches exactly one terminal state; its receipt
//!   resolves exactly once.
//! - `flush`/`close` resolve only after every batch enqueued before them
//!   (including in-flight retries) reaches a terminal state.
//! - `close` is terminal: the timer stops, remaining data drains, and all
//!   subsequent operations return [`ShipperError::Closed`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::batch::{Batch, BatchAccumulator, Completion};
use crate::config::ShipperConfig;
use crate::encode::{LogRecord, encode};
use crate::error::{ConfigError, ShipError, ShipperError};
use crate::retry::{self, DeliveryOutcome, RetryPolicy};
use hec_client::{DeliveryError, HecClient, HecEvent, Transport};

/// Commands crossing from handles to the worker.
enum Command {
    Send {
        event: HecEvent,
        completion: Completion,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
    Close {
        done: oneshot::Sender<()>,
    },
}

/// Awaitable handle resolving when the batch containing one sent record
/// reaches a terminal state.
///
/// Dropping a receipt is harmless; delivery proceeds regardless.
#[derive(Debug)]
pub struct Receipt {
    rx: oneshot::Receiver<Result<(), ShipError>>,
}

impl Receipt {
    /// Wait for the terminal state: `Ok(())` when the batch was
    /// delivered, `Err` when it was abandoned.
    pub async fn wait(self) -> Result<(), ShipError> {
        match self.rx.await {
            Ok(outcome) => outcome,
            // Worker gone before delivery; only reachable if the runtime
            // tore the task down.
            Err(_) => Err(ShipError {
                attempts: 0,
                source: DeliveryError::permanent("shipper terminated before delivery"),
            }),
        }
    }
}

/// Batching log shipper handle.
///
/// Cheap to clone; all clones feed the same worker. Constructed from a
/// validated [`ShipperConfig`], either over the real HTTP client
/// ([`Shipper::new`]) or over any [`Transport`] implementation
/// ([`Shipper::with_transport`]).
#[derive(Clone)]
pub struct Shipper {
    tx: mpsc::UnboundedSender<Command>,
    config: Arc<ShipperConfig>,
    closed: Arc<AtomicBool>,
}

impl Shipper {
    /// Create a shipper delivering through [`HecClient`].
    ///
    /// Must be called within a Tokio runtime; the worker task is spawned
    /// immediately.
    ///
    /// # Errors
    /// Returns [`ConfigError::Client`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: ShipperConfig) -> Result<Self, ConfigError> {
        let client = HecClient::builder()
            .url(config.url.clone())
            .token(config.token.clone())
            .timeout(config.timeout)
            .skip_verify(config.skip_verify)
            .build()?;
        Ok(Self::with_transport(config, client))
    }

    /// Create a shipper over a custom transport.
    ///
    /// Must be called within a Tokio runtime.
    pub fn with_transport<T: Transport>(config: ShipperConfig, transport: T) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let config = Arc::new(config);

        let worker = Worker {
            transport: Arc::new(transport),
            rx,
            accumulator: BatchAccumulator::new(config.max_batch_count, config.max_batch_size),
            queue: VecDeque::new(),
            in_flight: false,
            done_tx,
            done_rx,
            waiters: Vec::new(),
            policy: RetryPolicy {
                max_retries: config.max_retries,
                base_delay: config.retry_base_delay,
                max_delay: config.retry_max_delay,
            },
            silent_errors: config.silent_errors,
            batch_interval: config.batch_interval,
            timer_enabled: !config.batch_interval.is_zero(),
            closing: false,
            rx_open: true,
        };
        tokio::spawn(worker.run());

        Self {
            tx,
            config,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Encode and enqueue one record. Never blocks.
    ///
    /// The returned [`Receipt`] resolves once the batch containing this
    /// record reaches a terminal state.
    ///
    /// # Errors
    /// Returns [`ShipperError::Closed`] after [`close`](Self::close).
    pub fn send(&self, record: LogRecord) -> Result<Receipt, ShipperError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ShipperError::Closed);
        }
        let event = encode(record, &self.config);
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Command::Send {
                event,
                completion: tx,
            })
            .map_err(|_| ShipperError::Closed)?;
        Ok(Receipt { rx })
    }

    /// Seal any partial batch and wait until every batch enqueued so far
    /// (including in-flight retries) reaches a terminal state.
    ///
    /// # Errors
    /// Returns [`ShipperError::Closed`] after [`close`](Self::close).
    pub async fn flush(&self) -> Result<(), ShipperError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ShipperError::Closed);
        }
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Command::Flush { done: tx })
            .map_err(|_| ShipperError::Closed)?;
        rx.await.map_err(|_| ShipperError::Closed)
    }

    /// Stop timer-driven flushes, drain all remaining data, and shut the
    /// worker down. Terminal: subsequent `send`/`flush`/`close` calls on
    /// any clone return [`ShipperError::Closed`].
    pub async fn close(&self) -> Result<(), ShipperError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(ShipperError::Closed);
        }
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Command::Close { done: tx })
            .map_err(|_| ShipperError::Closed)?;
        rx.await.map_err(|_| ShipperError::Closed)
    }
}

/// A flush or close caller waiting for `remaining` more batch completions.
struct Waiter {
    remaining: usize,
    done: oneshot::Sender<()>,
}

struct Worker<T: Transport> {
    transport: Arc<T>,
    rx: mpsc::UnboundedReceiver<Command>,
    accumulator: BatchAccumulator,
    queue: VecDeque<Batch>,
    in_flight: bool,
    done_tx: mpsc::UnboundedSender<()>,
    done_rx: mpsc::UnboundedReceiver<()>,
    waiters: Vec<Waiter>,
    policy: RetryPolicy,
    silent_errors: bool,
    batch_interval: Duration,
    timer_enabled: bool,
    closing: bool,
    rx_open: bool,
}

impl<T: Transport> Worker<T> {
    async fn run(mut self) {
        // The interval must be non-zero even when the timer is disabled;
        // the select guard keeps it from firing.
        let period = if self.batch_interval.is_zero() {
            Duration::from_secs(3600)
        } else {
            self.batch_interval
        };
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.rx.recv(), if self.rx_open => match cmd {
                    Some(cmd) => self.on_command(cmd),
                    // All handles dropped: drain what remains, then exit.
                    None => {
                        self.rx_open = false;
                        self.begin_shutdown();
                    }
                },
                _ = ticker.tick(), if self.timer_enabled => self.on_tick(),
                Some(()) = self.done_rx.recv(), if self.in_flight => self.on_delivery_done(),
            }

            if self.closing && self.idle() {
                break;
            }
        }
    }

    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Send { event, completion } => {
                let sealed = self.accumulator.append(event, completion);
                self.queue.extend(sealed);
                if !self.timer_enabled {
                    // No timer scheduled: flush on every event.
                    if let Some(batch) = self.accumulator.take() {
                        self.queue.push_back(batch);
                    }
                }
                self.dispatch();
            }
            Command::Flush { done } => self.seal_and_register(done),
            Command::Close { done } => {
                self.begin_shutdown();
                self.seal_and_register(done);
            }
        }
    }

    /// Stop scheduling timer flushes and seal any partial batch.
    fn begin_shutdown(&mut self) {
        self.closing = true;
        self.timer_enabled = false;
        if let Some(batch) = self.accumulator.take() {
            self.queue.push_back(batch);
        }
        self.dispatch();
    }

    /// Seal the open batch and register a waiter for everything currently
    /// queued or in flight.
    fn seal_and_register(&mut self, done: oneshot::Sender<()>) {
        if let Some(batch) = self.accumulator.take() {
            self.queue.push_back(batch);
        }
        let remaining = self.queue.len() + usize::from(self.in_flight);
        if remaining == 0 {
            let _ = done.send(());
        } else {
            self.waiters.push(Waiter { remaining, done });
        }
        self.dispatch();
    }

    fn on_tick(&mut self) {
        if let Some(batch) = self.accumulator.take() {
            tracing::debug!(
                events = batch.events.len(),
                bytes = batch.byte_size,
                "interval flush"
            );
            self.queue.push_back(batch);
            self.dispatch();
        }
    }

    fn on_delivery_done(&mut self) {
        self.in_flight = false;

        let waiters = std::mem::take(&mut self.waiters);
        for mut waiter in waiters {
            waiter.remaining -= 1;
            if waiter.remaining == 0 {
                let _ = waiter.done.send(());
            } else {
                self.waiters.push(waiter);
            }
        }

        self.dispatch();
    }

    /// Start delivering the next queued batch unless one is in flight.
    /// Accumulation keeps running while the spawned delivery retries.
    fn dispatch(&mut self) {
        if self.in_flight {
            return;
        }
        let Some(batch) = self.queue.pop_front() else {
            return;
        };
        self.in_flight = true;

        let transport = Arc::clone(&self.transport);
        let policy = self.policy.clone();
        let silent_errors = self.silent_errors;
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            deliver_batch(transport, batch, policy, silent_errors).await;
            let _ = done.send(());
        });
    }

    fn idle(&self) -> bool {
        !self.in_flight && self.queue.is_empty() && self.accumulator.is_empty()
    }
}

/// Drive one batch to a terminal state and complete its receipts.
async fn deliver_batch<T: Transport>(
    transport: Arc<T>,
    batch: Batch,
    policy: RetryPolicy,
    silent_errors: bool,
) {
    let events = batch.events.len();
    let age_ms = batch.created_at.elapsed().as_millis() as u64;

    match retry::run(transport.as_ref(), &batch.events, &policy).await {
        DeliveryOutcome::Delivered { ack, attempts } => {
            tracing::debug!(events, attempts, age_ms, code = ack.code, "batch delivered");
            for completion in batch.completions {
                let _ = completion.send(Ok(()));
            }
        }
        DeliveryOutcome::Abandoned(err) => {
            if !silent_errors {
                tracing::warn!(
                    events,
                    attempts = err.attempts,
                    age_ms,
                    error = %err,
                    "batch abandoned"
                );
            }
            for completion in batch.completions {
                let _ = completion.send(Err(err.clone()));
            }
        }
    }
}
