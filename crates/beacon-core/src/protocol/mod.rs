//! Protocol payloads
//!
//! The typed documents an application hands to the SDK. Every payload kind
//! implements [`Payload`], which ties it to the envelope item type it travels
//! under and to the `type` discriminator written into its JSON document.

pub mod event;
pub mod sdk;
pub mod transaction;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::envelope::ItemType;
use crate::types::EventId;

pub use event::Event;
pub use sdk::{PackageInfo, SdkInfo};
pub use transaction::{Span, SpanStatus, TraceContext, Transaction, TransactionContexts};

/// Discriminator written as the `type` field of every payload document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// An error or message event
    Event,
    /// A finished performance transaction
    Transaction,
}

impl DocumentType {
    /// Wire name of this document type
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Transaction => "transaction",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Debug information
    Debug,
    /// Informational message
    Info,
    /// Something unexpected but recoverable
    Warning,
    /// An error
    Error,
    /// A failure that takes the application down
    Fatal,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// A typed document that can be carried by an envelope item
pub trait Payload: Serialize + DeserializeOwned {
    /// Item type tag this payload travels under
    const ITEM_TYPE: ItemType;

    /// Value of the document's `type` field
    const DOCUMENT_TYPE: DocumentType;

    /// Identifier of this payload, mirrored into the envelope header
    fn event_id(&self) -> EventId;

    /// The `type` field as decoded from the document
    fn document_type(&self) -> DocumentType;
}
