//! Transport seam
//!
//! The network transport lives outside this crate. The client hands every
//! envelope to a [`Transport`] from its background worker, one at a time.

use beacon_core::{Envelope, Result};
use std::time::Duration;

/// Delivers envelopes to their destination
pub trait Transport: Send + Sync {
    /// Deliver one envelope; may block
    fn send(&self, envelope: &Envelope) -> Result<()>;

    /// Wait until envelopes buffered inside the transport are delivered
    ///
    /// Returns `true` if everything was delivered within `timeout`.
    fn flush(&self, _timeout: Duration) -> bool {
        true
    }

    /// Flush and release resources; the transport is not used afterwards
    fn shutdown(&self, timeout: Duration) -> bool {
        self.flush(timeout)
    }
}

/// Transport that discards every envelope
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransport;

impl Transport for NoopTransport {
    fn send(&self, envelope: &Envelope) -> Result<()> {
        tracing::trace!(
            event_id = ?envelope.event_id(),
            items = envelope.len(),
            "discarding envelope"
        );
        Ok(())
    }
}
