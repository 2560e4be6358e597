//! Shared value types

pub mod identifiers;

pub use identifiers::{EventId, SpanId, TraceId};
