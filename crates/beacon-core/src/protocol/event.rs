//! Error and message events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DocumentType, Level, Payload, SdkInfo};
use crate::envelope::ItemType;
use crate::types::EventId;

fn default_platform() -> String {
    "native".to_string()
}

fn event_document() -> DocumentType {
    DocumentType::Event
}

/// A single error or message event
///
/// Optional attributes decode to `None` when absent from the document, which
/// keeps "not set" distinct from an empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier of this event
    pub event_id: EventId,
    #[serde(rename = "type", default = "event_document")]
    document_type: DocumentType,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Severity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// Human readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Name of the logger that produced the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    /// Platform identifier
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Release of the application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    /// Deployment environment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Host that produced the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    /// Distribution of the release
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
    /// Grouping override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Vec<String>>,
    /// SDK that produced the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<SdkInfo>,
    /// Indexed key/value tags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Arbitrary extra data
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Event {
    /// Create an empty event stamped with the current time
    pub fn new() -> Self {
        Self {
            event_id: EventId::new(),
            document_type: DocumentType::Event,
            timestamp: Utc::now(),
            level: None,
            message: None,
            logger: None,
            platform: default_platform(),
            release: None,
            environment: None,
            server_name: None,
            dist: None,
            fingerprint: None,
            sdk: None,
            tags: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Set the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the logger name
    #[must_use]
    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Add an extra value
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl Payload for Event {
    const ITEM_TYPE: ItemType = ItemType::Event;
    const DOCUMENT_TYPE: DocumentType = DocumentType::Event;

    fn event_id(&self) -> EventId {
        self.event_id
    }

    fn document_type(&self) -> DocumentType {
        self.document_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optionals_stay_unset() {
        let json = r#"{
            "event_id": "9ec79c33ec9942ab8353589fcb2e04dc",
            "timestamp": "2024-01-01T00:00:00Z"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.level, None);
        assert_eq!(event.message, None);
        assert_eq!(event.fingerprint, None);
        assert_eq!(event.platform, "native");
        assert_eq!(event.document_type(), DocumentType::Event);
    }

    #[test]
    fn empty_message_is_not_unset() {
        let event = Event::new().with_message("");
        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.message.as_deref(), Some(""));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{
            "event_id": "9ec79c33ec9942ab8353589fcb2e04dc",
            "timestamp": "2024-01-01T00:00:00Z",
            "level": "warning",
            "breadcrumbs": {"values": []},
            "future_field": 42
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.level, Some(Level::Warning));
    }
}
