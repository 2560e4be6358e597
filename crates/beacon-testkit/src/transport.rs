//! Test transports
//!
//! In-memory [`Transport`] implementations: one that records, one that can be
//! held closed to simulate a slow network, and one that always fails.

use beacon_client::Transport;
use beacon_core::{BeaconError, Envelope, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Transport that keeps every envelope it is given
#[derive(Debug, Default)]
pub struct RecordingTransport {
    envelopes: Mutex<Vec<Envelope>>,
    flushes: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl RecordingTransport {
    /// Create an empty recording transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelopes sent so far, in send order
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().clone()
    }

    /// Number of `flush` calls
    pub fn flush_calls(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Number of `shutdown` calls
    pub fn shutdown_calls(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn send(&self, envelope: &Envelope) -> Result<()> {
        self.envelopes.lock().push(envelope.clone());
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> bool {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn shutdown(&self, _timeout: Duration) -> bool {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        true
    }
}

/// Transport whose `send` blocks until [`BlockingTransport::release`]
#[derive(Debug, Default)]
pub struct BlockingTransport {
    open: Mutex<bool>,
    gate: Condvar,
    sent: AtomicUsize,
}

impl BlockingTransport {
    /// Create a closed gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate; blocked and future sends go through
    pub fn release(&self) {
        *self.open.lock() = true;
        self.gate.notify_all();
    }

    /// Number of envelopes that made it through the gate
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

impl Transport for BlockingTransport {
    fn send(&self, _envelope: &Envelope) -> Result<()> {
        let mut open = self.open.lock();
        while !*open {
            self.gate.wait(&mut open);
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Transport that rejects every envelope
#[derive(Debug, Default)]
pub struct FailingTransport {
    attempts: AtomicUsize,
}

impl FailingTransport {
    /// Create a failing transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of send attempts
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Transport for FailingTransport {
    fn send(&self, _envelope: &Envelope) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BeaconError::transport("connection refused"))
    }
}
