//! Envelopes: the unit of transport
//!
//! An [`Envelope`] is an ordered batch of [`EnvelopeItem`]s plus a small
//! header. Item order is significant: the first item is conventionally the
//! primary payload (an event or a transaction) and everything after it is
//! supplementary (attachments, reports).
//!
//! An envelope with no items is a valid intermediate value while it is being
//! assembled; transports never receive one.

mod item;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::protocol::{Payload, SdkInfo};
use crate::types::EventId;

pub use item::{EnvelopeItem, ItemHeader, ItemType};

/// Envelope-level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    /// Identifier of the primary payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// When the envelope was handed to the transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    /// SDK that produced the envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<SdkInfo>,
}

/// Ordered batch of envelope items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    header: EnvelopeHeader,
    items: Vec<EnvelopeItem>,
}

impl Envelope {
    /// Create an empty envelope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty envelope with the given header
    pub fn with_header(header: EnvelopeHeader) -> Self {
        Self {
            header,
            items: Vec::new(),
        }
    }

    /// Create an envelope holding a single typed payload
    ///
    /// Returns `None` (after logging) if the payload cannot be encoded.
    pub fn from_payload<T: Payload>(payload: &T) -> Option<Self> {
        let mut envelope = Self::new();
        envelope.add_payload(payload).then_some(envelope)
    }

    /// Append an item
    pub fn add_item(&mut self, item: EnvelopeItem) {
        self.items.push(item);
    }

    /// Encode and append a typed payload
    ///
    /// The first payload added also becomes the envelope's event id. Returns
    /// `false` if the payload could not be encoded; the envelope is unchanged.
    pub fn add_payload<T: Payload>(&mut self, payload: &T) -> bool {
        let Some(item) = EnvelopeItem::from_payload(payload) else {
            return false;
        };
        if self.header.event_id.is_none() {
            self.header.event_id = Some(payload.event_id());
        }
        self.items.push(item);
        true
    }

    /// Envelope header
    pub fn header(&self) -> &EnvelopeHeader {
        &self.header
    }

    /// Identifier of the primary payload
    pub fn event_id(&self) -> Option<EventId> {
        self.header.event_id
    }

    /// Record the SDK that produced this envelope
    pub fn set_sdk(&mut self, sdk: SdkInfo) {
        self.header.sdk = Some(sdk);
    }

    /// Record when this envelope was sent
    pub fn set_sent_at(&mut self, sent_at: DateTime<Utc>) {
        self.header.sent_at = Some(sent_at);
    }

    /// Items in insertion order
    pub fn items(&self) -> &[EnvelopeItem] {
        &self.items
    }

    /// Items carrying the given type tag, in insertion order
    pub fn items_of<'a>(
        &'a self,
        item_type: &'a ItemType,
    ) -> impl Iterator<Item = &'a EnvelopeItem> + 'a {
        self.items
            .iter()
            .filter(move |item| item.item_type() == item_type)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the envelope has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the envelope, returning its items
    pub fn into_items(self) -> Vec<EnvelopeItem> {
        self.items
    }

    /// Decode the first item tagged as `T`
    ///
    /// Only the first item with a matching tag is considered; if it fails to
    /// decode the result is `None` even when a later item of the same kind would
    /// decode. Use [`Envelope::items_of`] to visit every match.
    pub fn typed<T: Payload>(&self) -> Option<T> {
        self.items
            .iter()
            .find(|item| *item.item_type() == T::ITEM_TYPE)
            .and_then(EnvelopeItem::decode::<T>)
    }

    /// Decode the first item, at any position, whose bytes structurally decode as `T`
    ///
    /// Unlike [`Envelope::typed`] this ignores item tags and keeps scanning past
    /// items that fail to decode. Returns the item's index with the payload.
    pub fn first_decodable<T: Payload>(&self) -> Option<(usize, T)> {
        self.items
            .iter()
            .enumerate()
            .find_map(|(index, item)| codec::decode::<T>(item.payload()).map(|p| (index, p)))
    }
}

impl<'a> IntoIterator for &'a Envelope {
    type Item = &'a EnvelopeItem;
    type IntoIter = std::slice::Iter<'a, EnvelopeItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
