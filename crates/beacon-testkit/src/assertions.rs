//! Assertion helpers for envelopes

use beacon_core::{codec, Envelope, EnvelopeItem, Event, Payload, Transaction};

/// Find the first item that decodes as `T`, run `check` on it and return it
///
/// Matching is structural: every item's bytes are decoded as `T` in order,
/// whatever the item's type tag, and `check` receives the index of the first
/// one that decodes.
///
/// # Panics
/// If no item decodes as `T`.
pub fn assert_envelope_item<T: Payload>(
    items: &[EnvelopeItem],
    check: impl FnOnce(usize, &T),
) -> T {
    let (index, payload) = items
        .iter()
        .enumerate()
        .find_map(|(index, item)| {
            codec::decode::<T>(item.payload()).map(|payload| (index, payload))
        })
        .unwrap_or_else(|| {
            let types: Vec<_> = items.iter().map(|item| item.item_type().to_string()).collect();
            panic!(
                "no {} item in envelope (item types: {types:?})",
                T::DOCUMENT_TYPE
            )
        });
    check(index, &payload);
    payload
}

/// The envelope's event
///
/// # Panics
/// If the envelope holds no event.
pub fn expect_event(envelope: &Envelope) -> Event {
    assert_envelope_item::<Event>(envelope.items(), |_, _| {})
}

/// The envelope's transaction
///
/// # Panics
/// If the envelope holds no transaction.
pub fn expect_transaction(envelope: &Envelope) -> Transaction {
    assert_envelope_item::<Transaction>(envelope.items(), |_, _| {})
}

/// Assert that a hub or transport recorded `expected` envelopes
#[macro_export]
macro_rules! assert_envelope_count {
    ($recorder:expr, $expected:expr) => {
        assert_eq!(
            $recorder.envelopes().len(),
            $expected,
            "Expected {} envelopes, found {}",
            $expected,
            $recorder.envelopes().len()
        )
    };
}
