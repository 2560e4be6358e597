//! Typed access to envelope items: round trips, mismatches and ordering.

use beacon_core::{Envelope, EnvelopeItem, Event, ItemType, Level, Transaction};
use beacon_testkit::{
    assert_envelope_item, expect_event, expect_transaction, sample_event, sample_transaction,
};

#[test]
fn transaction_round_trips_through_first_item() {
    let tx = sample_transaction();
    let envelope = Envelope::from_payload(&tx).unwrap();

    let decoded = envelope.typed::<Transaction>().unwrap();
    assert_eq!(decoded, tx);
    assert_eq!(decoded.name.as_deref(), Some("GET /checkout"));
    assert_eq!(decoded.spans.len(), 1);
    assert_eq!(decoded.trace_id(), tx.trace_id());
    assert_eq!(envelope.event_id(), Some(tx.event_id));
}

#[test]
fn event_item_probed_as_transaction_is_absent() {
    let envelope = Envelope::from_payload(&sample_event()).unwrap();

    assert!(envelope.typed::<Transaction>().is_none());
    assert!(envelope.items()[0].transaction().is_none());
    assert!(envelope.first_decodable::<Transaction>().is_none());
    // Probing twice is side-effect free.
    assert!(envelope.typed::<Transaction>().is_none());
    assert!(envelope.typed::<Event>().is_some());
}

#[test]
fn items_keep_insertion_order() {
    let event = sample_event();
    let tx = sample_transaction();

    let mut envelope = Envelope::new();
    assert!(envelope.add_payload(&event));
    assert!(envelope.add_payload(&tx));

    let types: Vec<_> = envelope.items().iter().map(EnvelopeItem::item_type).collect();
    assert_eq!(types, vec![&ItemType::Event, &ItemType::Transaction]);
    assert_eq!(expect_event(&envelope), event);

    let (index, found) = envelope.first_decodable::<Transaction>().unwrap();
    assert_eq!(index, 1);
    assert_eq!(found, tx);
    assert_eq!(envelope.typed::<Transaction>(), Some(tx));
}

#[test]
fn structural_match_regardless_of_position() {
    let tx = sample_transaction();

    let mut envelope = Envelope::new();
    envelope.add_item(EnvelopeItem::attachment(
        b"trace dump".to_vec(),
        "dump.txt",
        None,
    ));
    envelope.add_payload(&tx);

    let found = assert_envelope_item::<Transaction>(envelope.items(), |index, found| {
        assert_eq!(index, 1);
        assert_eq!(found.event_id, tx.event_id);
    });
    assert_eq!(found, tx);
    assert_eq!(expect_transaction(&envelope), tx);
}

#[test]
fn later_items_of_same_kind_are_ignored_by_typed() {
    let first = Event::new().with_message("first").with_level(Level::Error);
    let second = Event::new().with_message("second");

    let mut envelope = Envelope::new();
    envelope.add_payload(&first);
    envelope.add_payload(&second);

    assert_eq!(envelope.typed::<Event>().unwrap().message.as_deref(), Some("first"));
    let all: Vec<_> = envelope
        .items_of(&ItemType::Event)
        .filter_map(EnvelopeItem::event)
        .collect();
    assert_eq!(all, vec![first, second]);
}

#[test]
fn structural_match_ignores_item_tags() {
    let event = sample_event();
    let bytes = beacon_core::codec::encode(&event).unwrap();

    let mut envelope = Envelope::new();
    envelope.add_item(EnvelopeItem::new(ItemType::Session, b"{}".to_vec()));
    envelope.add_item(EnvelopeItem::new(ItemType::from("forwarded"), bytes));

    assert!(envelope.typed::<Event>().is_none());
    let found = assert_envelope_item::<Event>(envelope.items(), |index, _| {
        assert_eq!(index, 1);
    });
    assert_eq!(found, event);
    assert_eq!(envelope.first_decodable::<Event>().map(|(i, _)| i), Some(1));
}
