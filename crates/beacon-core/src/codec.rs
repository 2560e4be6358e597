//! Payload codec
//!
//! JSON is the canonical representation of every payload document. The
//! `to_vec`/`from_slice` pair propagates errors for internal callers; the
//! `encode`/`decode` pair is the boundary used by envelope items:
//!
//! - `encode` fails closed: an encoding failure is logged and reported as
//!   `None`, never as a panic or an error the host has to handle.
//! - `decode` is type-directed: bytes that are corrupt or describe a different
//!   payload kind decode to `None`, so probing an item has no side effects.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{BeaconError, Result};
use crate::protocol::Payload;

/// Content type of encoded payload documents
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialize any serde-compatible value to JSON bytes
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| BeaconError::serialization(format!("failed to encode payload: {e}")))
}

/// Deserialize JSON bytes into any serde-compatible value
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| BeaconError::serialization(format!("failed to decode payload: {e}")))
}

/// Encode a payload, logging and returning `None` on failure
pub fn encode<T: Payload>(payload: &T) -> Option<Vec<u8>> {
    match to_vec(payload) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::error!(
                item_type = %T::ITEM_TYPE,
                event_id = %payload.event_id(),
                error = %err,
                "dropping payload that could not be encoded"
            );
            None
        }
    }
}

/// Decode bytes as payload kind `T`, or `None` when they describe anything else
pub fn decode<T: Payload>(bytes: &[u8]) -> Option<T> {
    from_slice::<T>(bytes)
        .ok()
        .filter(|payload| payload.document_type() == T::DOCUMENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Event, Level, Transaction};

    #[test]
    fn event_decodes_as_event() {
        let event = Event::new()
            .with_message("disk full")
            .with_level(Level::Error);
        let bytes = encode(&event).unwrap();
        assert_eq!(decode::<Event>(&bytes), Some(event));
    }

    #[test]
    fn event_does_not_decode_as_transaction() {
        let bytes = encode(&Event::new().with_message("boom")).unwrap();
        assert!(decode::<Transaction>(&bytes).is_none());
    }

    #[test]
    fn finished_transaction_does_not_decode_as_event() {
        let mut tx = Transaction::new("checkout", "http.server");
        tx.finish();
        let bytes = encode(&tx).unwrap();
        // Structurally close enough to parse as an event; the `type` check rejects it.
        assert!(decode::<Event>(&bytes).is_none());
        assert!(decode::<Transaction>(&bytes).is_some());
    }

    #[test]
    fn corrupt_bytes_decode_to_none() {
        assert!(decode::<Event>(b"{\"event_id\": ").is_none());
        assert!(decode::<Event>(&[0xff, 0xfe, 0x00]).is_none());
        assert!(decode::<Transaction>(b"").is_none());
    }

    #[test]
    fn from_slice_reports_serialization_error() {
        let err = from_slice::<Event>(b"[]").unwrap_err();
        assert!(matches!(err, BeaconError::Serialization { .. }));
    }
}
