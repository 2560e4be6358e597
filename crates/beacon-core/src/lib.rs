//! Beacon Core - envelope protocol and payload model
//!
//! This crate holds everything about *what* the Beacon SDK sends, with no
//! threads, queues or I/O of its own:
//!
//! ## Payloads
//! - [`Event`] and [`Transaction`] documents, tied to their envelope item type
//!   through the [`Payload`] trait
//! - Identifiers ([`EventId`], [`TraceId`], [`SpanId`]) and [`SdkInfo`]
//!
//! ## Codec
//! - [`codec::encode`] fails closed: failures are logged, never propagated
//! - [`codec::decode`] is type-directed: a mismatch is `None`, not an error
//!
//! ## Envelopes
//! - [`Envelope`]: ordered [`EnvelopeItem`]s plus an [`EnvelopeHeader`]
//! - Item bytes are frozen when the item is built
//! - Newline-delimited wire framing in [`envelope::wire`]

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

/// Identifier types
pub mod types;

/// Payload documents
pub mod protocol;

/// JSON payload codec
pub mod codec;

/// Envelopes, items and wire framing
pub mod envelope;

pub use envelope::{Envelope, EnvelopeHeader, EnvelopeItem, ItemHeader, ItemType};
pub use errors::{BeaconError, Result};
pub use protocol::{
    DocumentType, Event, Level, PackageInfo, Payload, SdkInfo, Span, SpanStatus, TraceContext,
    Transaction,
};
pub use types::{EventId, SpanId, TraceId};
