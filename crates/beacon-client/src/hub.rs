//! Hub: the process-wide entry point integrations talk to

use beacon_core::{Envelope, Event, EventId, Transaction};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;

use crate::client::Client;

/// What integrations need from the SDK's central state
pub trait Hub: Send + Sync {
    /// Queue an envelope for delivery; drops it if that is not possible
    fn capture_envelope(&self, envelope: Envelope);

    /// Block until queued envelopes are delivered or `timeout` elapses
    ///
    /// Best effort and infallible: a timeout just means some envelopes may
    /// not have been delivered.
    fn flush(&self, timeout: Duration);
}

/// [`Hub`] backed by an optional, rebindable [`Client`]
///
/// A hub without a client drops envelopes and flushes immediately.
#[derive(Debug, Default)]
pub struct ClientHub {
    client: RwLock<Option<Arc<Client>>>,
    last_event_id: Mutex<Option<EventId>>,
}

impl ClientHub {
    /// Create a hub bound to `client`
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client: RwLock::new(Some(client)),
            last_event_id: Mutex::new(None),
        }
    }

    /// Create a hub with no client
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Currently bound client
    pub fn client(&self) -> Option<Arc<Client>> {
        self.client.read().clone()
    }

    /// Replace the bound client, returning the previous one
    pub fn bind_client(&self, client: Option<Arc<Client>>) -> Option<Arc<Client>> {
        std::mem::replace(&mut *self.client.write(), client)
    }

    /// Capture an event through the bound client
    pub fn capture_event(&self, event: Event) -> EventId {
        let id = match self.client() {
            Some(client) => client.capture_event(event),
            None => EventId::nil(),
        };
        self.remember(id)
    }

    /// Capture a transaction through the bound client
    pub fn capture_transaction(&self, transaction: Transaction) -> EventId {
        let id = match self.client() {
            Some(client) => client.capture_transaction(transaction),
            None => EventId::nil(),
        };
        self.remember(id)
    }

    /// Id of the last event or transaction that was accepted
    pub fn last_event_id(&self) -> Option<EventId> {
        *self.last_event_id.lock()
    }

    /// Close the bound client, bounded by `timeout`, and unbind it
    pub fn close(&self, timeout: Duration) -> bool {
        match self.bind_client(None) {
            Some(client) => client.close(timeout),
            None => true,
        }
    }

    fn remember(&self, id: EventId) -> EventId {
        if !id.is_nil() {
            *self.last_event_id.lock() = Some(id);
        }
        id
    }
}

impl Hub for ClientHub {
    fn capture_envelope(&self, envelope: Envelope) {
        match self.client() {
            Some(client) => {
                let event_id = envelope.event_id();
                if client.capture_envelope(envelope) {
                    if let Some(id) = event_id {
                        self.remember(id);
                    }
                }
            }
            None => tracing::debug!("no client bound, dropping envelope"),
        }
    }

    fn flush(&self, timeout: Duration) {
        let Some(client) = self.client() else {
            return;
        };
        if !client.flush(timeout) {
            tracing::debug!(
                timeout_ms = timeout.as_millis() as u64,
                pending = client.pending(),
                "flush returned before all envelopes were delivered"
            );
        }
    }
}
