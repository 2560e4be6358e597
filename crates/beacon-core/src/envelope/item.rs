//! Envelope items
//!
//! An item pairs a type tag with the payload bytes produced when the item was
//! built. The bytes are never re-serialized afterwards, so the wire image of an
//! item is stable no matter what happens to the object it was built from.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::codec::{self, JSON_CONTENT_TYPE};
use crate::protocol::{Event, Payload, Transaction};

/// Type tag of an envelope item
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// An error or message event
    Event,
    /// A performance transaction
    Transaction,
    /// A file attached to an event
    Attachment,
    /// A release-health session update
    Session,
    /// Outcomes of discarded payloads
    ClientReport,
    /// A tag this SDK does not know; preserved verbatim
    Other(String),
}

impl ItemType {
    /// Wire name of this item type
    pub fn as_str(&self) -> &str {
        match self {
            Self::Event => "event",
            Self::Transaction => "transaction",
            Self::Attachment => "attachment",
            Self::Session => "session",
            Self::ClientReport => "client_report",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for ItemType {
    fn from(name: &str) -> Self {
        match name {
            "event" => Self::Event,
            "transaction" => Self::Transaction,
            "attachment" => Self::Attachment,
            "session" => Self::Session,
            "client_report" => Self::ClientReport,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Ok(Self::from(name.as_ref()))
    }
}

/// Per-item header written ahead of the payload bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHeader {
    /// Item type tag
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Payload length in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// MIME type of the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// File name, for attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// One typed payload inside an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeItem {
    header: ItemHeader,
    payload: Vec<u8>,
}

impl EnvelopeItem {
    /// Create an item from already serialized bytes
    pub fn new(item_type: ItemType, payload: Vec<u8>) -> Self {
        Self::from_parts(
            ItemHeader {
                item_type,
                length: None,
                content_type: None,
                filename: None,
            },
            payload,
        )
    }

    /// Encode a typed payload into an item
    ///
    /// Returns `None` (after logging) if the payload cannot be encoded.
    pub fn from_payload<T: Payload>(payload: &T) -> Option<Self> {
        let bytes = codec::encode(payload)?;
        Some(Self::from_parts(
            ItemHeader {
                item_type: T::ITEM_TYPE,
                length: None,
                content_type: Some(JSON_CONTENT_TYPE.to_string()),
                filename: None,
            },
            bytes,
        ))
    }

    /// Create an attachment item
    pub fn attachment(
        payload: Vec<u8>,
        filename: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        Self::from_parts(
            ItemHeader {
                item_type: ItemType::Attachment,
                length: None,
                content_type,
                filename: Some(filename.into()),
            },
            payload,
        )
    }

    /// Build an item from a header and payload, fixing up the declared length
    pub(crate) fn from_parts(mut header: ItemHeader, payload: Vec<u8>) -> Self {
        header.length = Some(payload.len());
        Self { header, payload }
    }

    /// Item type tag
    pub fn item_type(&self) -> &ItemType {
        &self.header.item_type
    }

    /// Item header
    pub fn header(&self) -> &ItemHeader {
        &self.header
    }

    /// Frozen payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Decode the payload as `T` if this item is tagged as `T`
    pub fn decode<T: Payload>(&self) -> Option<T> {
        if self.header.item_type != T::ITEM_TYPE {
            return None;
        }
        codec::decode(&self.payload)
    }

    /// Decode the payload as an event
    pub fn event(&self) -> Option<Event> {
        self.decode()
    }

    /// Decode the payload as a transaction
    pub fn transaction(&self) -> Option<Transaction> {
        self.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_type_preserves_unknown_tags() {
        let parsed: ItemType = serde_json::from_str("\"profile_chunk\"").unwrap();
        assert_eq!(parsed, ItemType::Other("profile_chunk".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"profile_chunk\"");
        assert_eq!(ItemType::from("client_report"), ItemType::ClientReport);
    }

    #[test]
    fn bytes_are_frozen_at_construction() {
        let mut event = Event::new().with_message("before");
        let item = EnvelopeItem::from_payload(&event).unwrap();
        event.message = Some("after".to_string());

        let decoded = item.event().unwrap();
        assert_eq!(decoded.message.as_deref(), Some("before"));
        assert_eq!(item.header().length, Some(item.len()));
    }

    #[test]
    fn decode_respects_the_tag() {
        let event = Event::new();
        let bytes = codec::encode(&event).unwrap();
        let mislabeled = EnvelopeItem::new(ItemType::Transaction, bytes);
        assert!(mislabeled.event().is_none());
        assert!(mislabeled.transaction().is_none());
    }

    #[test]
    fn attachment_carries_filename() {
        let item = EnvelopeItem::attachment(
            b"line one\nline two".to_vec(),
            "log.txt",
            Some("text/plain".to_string()),
        );
        assert_eq!(item.item_type(), &ItemType::Attachment);
        assert_eq!(item.header().filename.as_deref(), Some("log.txt"));
        assert!(item.event().is_none());
    }
}
