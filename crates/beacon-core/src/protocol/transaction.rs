//! Performance transactions and their spans

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DocumentType, Payload, SdkInfo};
use crate::envelope::ItemType;
use crate::types::{EventId, SpanId, TraceId};

/// Outcome of a span or transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    /// The operation completed successfully
    Ok,
    /// The operation was cancelled
    Cancelled,
    /// Unknown error
    Unknown,
    /// Client supplied an invalid argument
    InvalidArgument,
    /// Deadline expired before the operation finished
    DeadlineExceeded,
    /// A requested entity was not found
    NotFound,
    /// Caller lacks permission
    PermissionDenied,
    /// Resource exhausted or rate limited
    ResourceExhausted,
    /// Unimplemented operation
    Unimplemented,
    /// Service unavailable
    Unavailable,
    /// Internal error
    InternalError,
}

/// Trace context of a transaction's root span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// Trace this transaction belongs to
    pub trace_id: TraceId,
    /// Root span of the transaction
    pub span_id: SpanId,
    /// Remote parent, when the trace was continued from elsewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<SpanId>,
    /// Operation name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    /// Outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpanStatus>,
}

/// Contexts attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionContexts {
    /// Trace context (required)
    pub trace: TraceContext,
}

/// A timed unit of work inside a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Identifier of this span
    pub span_id: SpanId,
    /// Span this one is nested in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<SpanId>,
    /// Trace the span belongs to
    pub trace_id: TraceId,
    /// Operation name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start time
    pub start_timestamp: DateTime<Utc>,
    /// End time, unset while the span is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SpanStatus>,
    /// Indexed key/value tags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Span {
    /// Stamp the end time unless already finished
    pub fn finish(&mut self) {
        if self.timestamp.is_none() {
            self.timestamp = Some(Utc::now());
        }
    }

    /// Whether the span has an end time
    pub fn is_finished(&self) -> bool {
        self.timestamp.is_some()
    }
}

/// A performance transaction: a root span plus its finished children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier of this transaction
    pub event_id: EventId,
    #[serde(rename = "type")]
    document_type: DocumentType,
    /// Transaction name
    #[serde(rename = "transaction", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Start time
    pub start_timestamp: DateTime<Utc>,
    /// End time, unset until [`Transaction::finish`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Contexts, including the trace context
    pub contexts: TransactionContexts,
    /// Finished child spans
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,
    /// Platform identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Release of the application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Deployment environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// SDK that produced the transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<SdkInfo>,
    /// Indexed key/value tags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Transaction {
    /// Start a new transaction on a fresh trace
    pub fn new(name: impl Into<String>, op: impl Into<String>) -> Self {
        Self::continue_trace(name, op, TraceId::new(), None)
    }

    /// Start a new transaction continuing an existing trace
    pub fn continue_trace(
        name: impl Into<String>,
        op: impl Into<String>,
        trace_id: TraceId,
        parent_span_id: Option<SpanId>,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            document_type: DocumentType::Transaction,
            name: Some(name.into()),
            start_timestamp: Utc::now(),
            timestamp: None,
            contexts: TransactionContexts {
                trace: TraceContext {
                    trace_id,
                    span_id: SpanId::new(),
                    parent_span_id,
                    op: Some(op.into()),
                    status: None,
                },
            },
            spans: Vec::new(),
            platform: Some("native".to_string()),
            release: None,
            environment: None,
            sdk: None,
            tags: BTreeMap::new(),
        }
    }

    /// Trace this transaction belongs to
    pub fn trace_id(&self) -> TraceId {
        self.contexts.trace.trace_id
    }

    /// Start a child span directly under the transaction's root span
    pub fn start_child(&self, op: impl Into<String>, description: impl Into<String>) -> Span {
        Span {
            span_id: SpanId::new(),
            parent_span_id: Some(self.contexts.trace.span_id),
            trace_id: self.contexts.trace.trace_id,
            op: Some(op.into()),
            description: Some(description.into()),
            start_timestamp: Utc::now(),
            timestamp: None,
            status: None,
            tags: BTreeMap::new(),
        }
    }

    /// Record a child span, finishing it if still running
    pub fn finish_span(&mut self, mut span: Span) {
        span.finish();
        self.spans.push(span);
    }

    /// Set the outcome of the root span
    pub fn set_status(&mut self, status: SpanStatus) {
        self.contexts.trace.status = Some(status);
    }

    /// Stamp the end time unless already finished
    pub fn finish(&mut self) {
        if self.timestamp.is_none() {
            self.timestamp = Some(Utc::now());
        }
    }

    /// Whether the transaction has an end time
    pub fn is_finished(&self) -> bool {
        self.timestamp.is_some()
    }
}

impl Payload for Transaction {
    const ITEM_TYPE: ItemType = ItemType::Transaction;
    const DOCUMENT_TYPE: DocumentType = DocumentType::Transaction;

    fn event_id(&self) -> EventId {
        self.event_id
    }

    fn document_type(&self) -> DocumentType {
        self.document_type
    }
}
