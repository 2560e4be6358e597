//! Client with a bounded background queue
//!
//! Application threads push envelopes into a bounded FIFO queue; a single
//! worker thread pops them in order and hands them to the transport. The queue
//! never blocks producers: when it is full, or the client is closed, the
//! envelope is dropped and the drop is logged.
//!
//! Progress is tracked with two counters. `accepted` counts envelopes admitted
//! to the queue and `handled` counts envelopes the worker has finished with
//! (delivered or failed). Because the worker is FIFO, `handled >= n` means every
//! one of the first `n` accepted envelopes reached the transport, which is what
//! [`Client::flush`] waits for.

use beacon_core::{Envelope, Event, EventId, Payload, Result, Transaction};
use chrono::Utc;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::ClientOptions;
use crate::transport::Transport;

const WORKER_THREAD_NAME: &str = "beacon-transport";

#[derive(Debug, Default)]
struct QueueState {
    queue: VecDeque<Envelope>,
    accepted: u64,
    handled: u64,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<QueueState>,
    work_available: Condvar,
    progress: Condvar,
}

impl Shared {
    /// Wait until `handled` reaches `target` or the deadline passes
    fn wait_for(
        &self,
        state: &mut MutexGuard<'_, QueueState>,
        target: u64,
        deadline: Option<Instant>,
    ) -> bool {
        while state.handled < target {
            match deadline {
                Some(deadline) => {
                    if self.progress.wait_until(state, deadline).timed_out() {
                        return state.handled >= target;
                    }
                }
                None => self.progress.wait(state),
            }
        }
        true
    }
}

fn run_worker(shared: Arc<Shared>, transport: Arc<dyn Transport>) {
    tracing::debug!("transport worker started");
    loop {
        let mut envelope = {
            let mut state = shared.state.lock();
            loop {
                if let Some(envelope) = state.queue.pop_front() {
                    break envelope;
                }
                if state.closed {
                    tracing::debug!(handled = state.handled, "transport worker stopped");
                    return;
                }
                shared.work_available.wait(&mut state);
            }
        };

        envelope.set_sent_at(Utc::now());
        match catch_unwind(AssertUnwindSafe(|| transport.send(&envelope))) {
            Ok(Ok(())) => {
                tracing::trace!(event_id = ?envelope.event_id(), "envelope sent");
            }
            Ok(Err(err)) => {
                tracing::warn!(event_id = ?envelope.event_id(), error = %err, "failed to send envelope");
            }
            Err(_) => {
                tracing::error!(event_id = ?envelope.event_id(), "transport panicked while sending envelope");
            }
        }

        shared.state.lock().handled += 1;
        shared.progress.notify_all();
    }
}

/// Buffers envelopes and delivers them through a [`Transport`]
pub struct Client {
    options: ClientOptions,
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("options", &self.options)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Validate the options and start the transport worker
    pub fn new(options: ClientOptions, transport: Arc<dyn Transport>) -> Result<Self> {
        options.validate()?;

        let shared = Arc::new(Shared::default());
        let worker = {
            let shared = Arc::clone(&shared);
            let transport = Arc::clone(&transport);
            std::thread::Builder::new()
                .name(WORKER_THREAD_NAME.to_string())
                .spawn(move || run_worker(shared, transport))?
        };

        Ok(Self {
            options,
            shared,
            transport,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Options this client was built with
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Queue an envelope for delivery
    ///
    /// Returns `false` if the envelope was dropped: it was empty, the queue was
    /// full, or the client is closed.
    pub fn capture_envelope(&self, mut envelope: Envelope) -> bool {
        if envelope.is_empty() {
            tracing::debug!("dropping empty envelope");
            return false;
        }
        if envelope.header().sdk.is_none() {
            envelope.set_sdk(self.options.sdk.clone());
        }

        let mut state = self.shared.state.lock();
        if state.closed {
            tracing::debug!(event_id = ?envelope.event_id(), "client closed, dropping envelope");
            return false;
        }
        if state.queue.len() >= self.options.max_queue_size {
            tracing::warn!(
                event_id = ?envelope.event_id(),
                max_queue_size = self.options.max_queue_size,
                "envelope queue full, dropping envelope"
            );
            return false;
        }
        state.queue.push_back(envelope);
        state.accepted += 1;
        drop(state);

        self.shared.work_available.notify_one();
        true
    }

    /// Apply option defaults to an event and queue it
    ///
    /// Returns the event's id, or the nil id if it was dropped.
    pub fn capture_event(&self, mut event: Event) -> EventId {
        let options = &self.options;
        event.release = event.release.or_else(|| options.release.clone());
        event.environment = event.environment.or_else(|| options.environment.clone());
        event.server_name = event.server_name.or_else(|| options.server_name.clone());
        event.dist = event.dist.or_else(|| options.dist.clone());
        event.sdk = event.sdk.or_else(|| Some(options.sdk.clone()));
        self.capture_payload(&event)
    }

    /// Apply option defaults to a transaction and queue it
    ///
    /// Unfinished transactions are finished first. Returns the transaction's
    /// id, or the nil id if it was dropped.
    pub fn capture_transaction(&self, mut transaction: Transaction) -> EventId {
        let options = &self.options;
        transaction.finish();
        transaction.release = transaction.release.or_else(|| options.release.clone());
        transaction.environment = transaction
            .environment
            .or_else(|| options.environment.clone());
        transaction.sdk = transaction.sdk.or_else(|| Some(options.sdk.clone()));
        self.capture_payload(&transaction)
    }

    fn capture_payload<T: Payload>(&self, payload: &T) -> EventId {
        let Some(envelope) = Envelope::from_payload(payload) else {
            return EventId::nil();
        };
        if self.capture_envelope(envelope) {
            payload.event_id()
        } else {
            EventId::nil()
        }
    }

    /// Envelopes accepted but not yet handed to the transport
    pub fn pending(&self) -> u64 {
        let state = self.shared.state.lock();
        state.accepted - state.handled
    }

    /// Whether [`Client::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Block until every envelope accepted before this call reached the
    /// transport and the transport flushed, or `timeout` elapses
    ///
    /// Returns `true` if everything was delivered in time. A `false` result is
    /// not an error: whatever was sent before the deadline stays sent.
    pub fn flush(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.state.lock();
        let target = state.accepted;
        if !self.shared.wait_for(&mut state, target, deadline) {
            tracing::debug!(
                pending = target - state.handled,
                timeout_ms = timeout.as_millis() as u64,
                "flush timed out"
            );
            return false;
        }
        drop(state);

        self.transport.flush(remaining(deadline))
    }

    /// Stop accepting envelopes, drain the queue and shut the transport down
    ///
    /// Bounded by `timeout`. If the queue does not drain in time the worker is
    /// left to finish in the background. Calling `close` again only waits for
    /// the queue.
    pub fn close(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.state.lock();
        let already_closed = std::mem::replace(&mut state.closed, true);
        let target = state.accepted;
        self.shared.work_available.notify_all();

        let drained = self.shared.wait_for(&mut state, target, deadline);
        drop(state);
        if already_closed {
            return drained;
        }

        if !drained {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                pending = self.pending(),
                "client closed before the queue drained"
            );
            return false;
        }

        let transport_done = self.transport.shutdown(remaining(deadline));
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::error!("transport worker panicked");
            }
        }
        transport_done
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shared.state.lock().closed = true;
        self.shared.work_available.notify_all();
    }
}

fn remaining(deadline: Option<Instant>) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(Instant::now()),
        None => Duration::MAX,
    }
}
