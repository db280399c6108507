//! Classification of human-originated events.

use super::ClassifyContext;
use super::language::detect_language;
use crate::core::models::RawEvent;
use crate::error::{ChatnormError, Result};
use crate::parsing::UserContent;
use crate::record::{Language, MessageBody, MessageType, NormalizedRecord};

/// Builds the record for a user event.
///
/// Quick replies beat attachments, which beat plain text. Attachment
/// records keep the attachment list as JSON text and never get a language.
/// The channel type must be present in the directory. User records never
/// carry a flow.
pub fn classify_user(
    ctx: &ClassifyContext<'_>,
    event: &RawEvent,
    decoded: &str,
    user_id: &str,
) -> Result<NormalizedRecord> {
    let body = match UserContent::parse(decoded)? {
        UserContent::QuickReply { text } => {
            let language = detect_language(&text);
            MessageBody::new(MessageType::QuickReply, text, language)
        }
        UserContent::Attachments(attachments) => MessageBody::new(
            MessageType::Attachment,
            serde_json::to_string(&attachments)?,
            Language::Unknown,
        ),
        UserContent::Text(text) => {
            let language = detect_language(&text);
            MessageBody::new(MessageType::Text, text, language)
        }
        UserContent::Unrecognized(reason) => {
            return Err(ChatnormError::shape("user payload", reason));
        }
    };

    let channel_type = ctx
        .directory
        .resolve(&event.channel_id)
        .ok_or_else(|| ChatnormError::unresolved_channel(&event.channel_id))?;

    NormalizedRecord::new(event, user_id, body, channel_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FlowMatcher;
    use crate::core::models::{ChannelDescriptor, ChannelDirectory, EventSource, FlowRule};

    fn directory() -> ChannelDirectory {
        ChannelDirectory::new(vec![ChannelDescriptor::new("ch-1", "FACEBOOK")])
    }

    fn classify(payload: &str) -> Result<NormalizedRecord> {
        let directory = directory();
        let flows = FlowMatcher::new(&[FlowRule::new("ANY", ["."])]).unwrap();
        let ctx = ClassifyContext::new(&directory, &flows);
        let event = RawEvent::from_payload("ch-1", 1705314600000, EventSource::Human, payload);
        classify_user(&ctx, &event, payload, "u1")
    }

    #[test]
    fn test_text() {
        let record = classify(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(record.message_type, MessageType::Text);
        assert_eq!(record.message, "hello");
        assert_eq!(record.language, Language::Eng);
        assert_eq!(record.flow, "UNKNOWN");
        assert_eq!(record.channel_type, "FACEBOOK");
    }

    #[test]
    fn test_quick_reply_thai() {
        let record = classify(r#"{"quick_reply": {"payload": "GREET"}, "text": "สวัสดี"}"#).unwrap();
        assert_eq!(record.message_type, MessageType::QuickReply);
        assert_eq!(record.message, "สวัสดี");
        assert_eq!(record.language, Language::Thai);
    }

    #[test]
    fn test_attachments_are_opaque_json() {
        let record = classify(
            r#"{"attachments": [{"type": "image", "payload": {"url": "http://x/a.png"}}]}"#,
        )
        .unwrap();
        assert_eq!(record.message_type, MessageType::Attachment);
        assert_eq!(record.language, Language::Unknown);

        let parsed: serde_json::Value = serde_json::from_str(&record.message).unwrap();
        assert_eq!(parsed[0]["payload"]["url"], "http://x/a.png");
    }

    #[test]
    fn test_flow_is_never_set() {
        let record = classify(r#"{"text": "book a room"}"#).unwrap();
        assert!(!record.has_flow());
    }

    #[test]
    fn test_unresolved_channel() {
        let directory = ChannelDirectory::default();
        let flows = FlowMatcher::default();
        let ctx = ClassifyContext::new(&directory, &flows);
        let event = RawEvent::from_payload("ch-404", 0, EventSource::Human, "");
        let err = classify_user(&ctx, &event, r#"{"text": "hi"}"#, "u1").unwrap_err();
        assert!(err.is_unresolved_channel());
    }

    #[test]
    fn test_unrecognized_is_parse_error() {
        let err = classify(r#"{"sticker_id": 42}"#).unwrap_err();
        assert!(err.is_parse());
    }
}
