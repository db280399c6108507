//! The normalized output record.
//!
//! Every raw event becomes exactly one [`NormalizedRecord`]. Records are
//! created by the classifiers and never mutated afterwards.
//!
//! # Example
//!
//! ```rust
//! use chatnorm::core::models::{EventSource, RawEvent};
//! use chatnorm::record::{Language, MessageBody, MessageType, NormalizedRecord};
//!
//! # fn main() -> chatnorm::Result<()> {
//! let event = RawEvent::from_payload("ch-1", 1705314600000, EventSource::Human, "{}");
//! let body = MessageBody::new(MessageType::Text, "hello", Language::Eng);
//! let record = NormalizedRecord::new(&event, "u1", body, "FACEBOOK")?;
//!
//! assert_eq!(record.flow, "UNKNOWN");
//! assert_eq!(record.thai_timestamp.offset().local_minus_utc(), 7 * 3600);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Asia::Bangkok;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::models::{EventSource, RawEvent};
use crate::error::{ChatnormError, Result};

/// Flow label for records that match no rule, and for every user record.
pub const UNKNOWN_FLOW: &str = "UNKNOWN";

/// Shape of a normalized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    QuickReply,
    Text,
    /// User-side attachment list, kept as serialized JSON
    Attachment,
    Image,
    UnknownAttachment,
    ButtonTemplate,
    GenericTemplate,
    /// Multi-part bot turn whose first text matched a flow
    SequenceOfMessage,
    /// Multi-part bot turn whose first text matched no flow
    UnknownSequenceOfMessage,
    /// Bot turn with no recognizable text or attachment
    Unknown,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::QuickReply => "QUICK_REPLY",
            MessageType::Text => "TEXT",
            MessageType::Attachment => "ATTACHMENT",
            MessageType::Image => "IMAGE",
            MessageType::UnknownAttachment => "UNKNOWN_ATTACHMENT",
            MessageType::ButtonTemplate => "BUTTON_TEMPLATE",
            MessageType::GenericTemplate => "GENERIC_TEMPLATE",
            MessageType::SequenceOfMessage => "SEQUENCE_OF_MESSAGE",
            MessageType::UnknownSequenceOfMessage => "UNKNOWN_SEQUENCE_OF_MESSAGE",
            MessageType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detected script of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "THAI")]
    Thai,
    #[serde(rename = "ENG")]
    Eng,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Thai => "THAI",
            Language::Eng => "ENG",
            Language::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classified part of a record: what a classifier decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    pub message_type: MessageType,
    pub message: String,
    pub language: Language,
    /// `None` stores as [`UNKNOWN_FLOW`]
    pub flow: Option<String>,
}

impl MessageBody {
    pub fn new(message_type: MessageType, message: impl Into<String>, language: Language) -> Self {
        Self {
            message_type,
            message: message.into(),
            language,
            flow: None,
        }
    }

    #[must_use]
    pub fn with_flow(mut self, flow: Option<String>) -> Self {
        self.flow = flow;
        self
    }
}

/// One analytics-ready message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Fresh random v4 UUID per record
    #[serde(rename = "id")]
    pub record_id: Uuid,
    pub channel_id: String,
    pub user_id: String,
    pub source: EventSource,
    pub interact_with: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub message: String,
    pub language: Language,
    pub flow: String,
    pub utc_timestamp: DateTime<Utc>,
    /// Same instant as `utc_timestamp`, at UTC+7
    pub thai_timestamp: DateTime<FixedOffset>,
    pub channel_type: String,
}

impl NormalizedRecord {
    /// Builds a record for `event` from a classified body.
    ///
    /// Both timestamps derive from the event's single epoch value.
    pub fn new(
        event: &RawEvent,
        user_id: &str,
        body: MessageBody,
        channel_type: impl Into<String>,
    ) -> Result<Self> {
        let (utc_timestamp, thai_timestamp) = event_instant(event.timestamp_ms)?;

        Ok(Self {
            record_id: Uuid::new_v4(),
            channel_id: event.channel_id.clone(),
            user_id: user_id.to_string(),
            source: event.source,
            interact_with: event.interact_with.clone(),
            message_type: body.message_type,
            message: body.message,
            language: body.language,
            flow: body.flow.unwrap_or_else(|| UNKNOWN_FLOW.to_string()),
            utc_timestamp,
            thai_timestamp,
            channel_type: channel_type.into(),
        })
    }

    /// Returns `true` if a flow rule matched this record.
    pub fn has_flow(&self) -> bool {
        self.flow != UNKNOWN_FLOW
    }
}

/// Renders epoch milliseconds as the same instant in UTC and Asia/Bangkok.
pub fn event_instant(timestamp_ms: i64) -> Result<(DateTime<Utc>, DateTime<FixedOffset>)> {
    let utc = DateTime::from_timestamp_millis(timestamp_ms)
        .ok_or(ChatnormError::InvalidTimestamp { timestamp_ms })?;
    let thai = utc.with_timezone(&Bangkok).fixed_offset();
    Ok((utc, thai))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> RawEvent {
        RawEvent::from_payload("ch-1", 1705314600123, EventSource::Human, "{}")
            .with_interact_with("bot-1")
    }

    #[test]
    fn test_event_instant_same_instant() {
        let (utc, thai) = event_instant(1705314600123).unwrap();
        assert_eq!(utc.timestamp_millis(), 1705314600123);
        assert_eq!(thai.timestamp_millis(), 1705314600123);
        assert_eq!(thai.offset().local_minus_utc(), 7 * 3600);
        assert_eq!(thai.to_rfc3339(), "2024-01-15T17:30:00.123+07:00");
    }

    #[test]
    fn test_event_instant_out_of_range() {
        let err = event_instant(i64::MAX).unwrap_err();
        assert!(matches!(err, ChatnormError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_record_defaults_flow_to_unknown() {
        let body = MessageBody::new(MessageType::Text, "hi", Language::Eng);
        let record = NormalizedRecord::new(&sample_event(), "u1", body, "FACEBOOK").unwrap();

        assert_eq!(record.flow, UNKNOWN_FLOW);
        assert!(!record.has_flow());
        assert_eq!(record.user_id, "u1");
        assert_eq!(record.interact_with, "bot-1");
        assert_eq!(record.channel_type, "FACEBOOK");
    }

    #[test]
    fn test_record_ids_are_fresh() {
        let body = MessageBody::new(MessageType::Text, "hi", Language::Eng);
        let a = NormalizedRecord::new(&sample_event(), "u1", body.clone(), "X").unwrap();
        let b = NormalizedRecord::new(&sample_event(), "u1", body, "X").unwrap();
        assert_ne!(a.record_id, b.record_id);
    }

    #[test]
    fn test_record_serialized_names() {
        let body = MessageBody::new(MessageType::UnknownSequenceOfMessage, "hi", Language::Thai)
            .with_flow(Some("BOOKING".into()));
        let record = NormalizedRecord::new(&sample_event(), "u1", body, "LINE").unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], "UNKNOWN_SEQUENCE_OF_MESSAGE");
        assert_eq!(value["language"], "THAI");
        assert_eq!(value["flow"], "BOOKING");
        assert_eq!(value["source"], "user");
        assert!(value["id"].is_string());
        assert_eq!(value["thai_timestamp"], "2024-01-15T17:30:00.123+07:00");
    }

    #[test]
    fn test_message_type_as_str_matches_serde() {
        for ty in [
            MessageType::QuickReply,
            MessageType::Text,
            MessageType::Attachment,
            MessageType::Image,
            MessageType::UnknownAttachment,
            MessageType::ButtonTemplate,
            MessageType::GenericTemplate,
            MessageType::SequenceOfMessage,
            MessageType::UnknownSequenceOfMessage,
            MessageType::Unknown,
        ] {
            let json = serde_json::to_value(ty).unwrap();
            assert_eq!(json, ty.as_str());
        }
    }
}
