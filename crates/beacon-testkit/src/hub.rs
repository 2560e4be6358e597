//! Recording hub

use beacon_client::Hub;
use beacon_core::Envelope;
use parking_lot::Mutex;
use std::time::Duration;

/// [`Hub`] that records every call instead of delivering anything
#[derive(Debug, Default)]
pub struct RecordingHub {
    envelopes: Mutex<Vec<Envelope>>,
    flushes: Mutex<Vec<Duration>>,
    flush_delay: Option<Duration>,
}

impl RecordingHub {
    /// Create an empty recording hub
    pub fn new() -> Self {
        Self::default()
    }

    /// A hub whose `flush` sleeps for `delay` before returning
    pub fn with_flush_delay(delay: Duration) -> Self {
        Self {
            flush_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Envelopes captured so far
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().clone()
    }

    /// Timeout of every `flush` call, in call order
    pub fn flush_calls(&self) -> Vec<Duration> {
        self.flushes.lock().clone()
    }
}

impl Hub for RecordingHub {
    fn capture_envelope(&self, envelope: Envelope) {
        self.envelopes.lock().push(envelope);
    }

    fn flush(&self, timeout: Duration) {
        self.flushes.lock().push(timeout);
        if let Some(delay) = self.flush_delay {
            std::thread::sleep(delay.min(timeout));
        }
    }
}
