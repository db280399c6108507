//! Classification of bot-originated events.

use super::attachment::classify_attachment;
use super::language::detect_language;
use super::{Classified, ClassifyContext};
use crate::core::models::RawEvent;
use crate::error::{ChatnormError, Result};
use crate::parsing::{BotContent, BotPart};
use crate::record::{Language, MessageBody, MessageType, NormalizedRecord};

/// Builds the record for a bot event.
///
/// The baseline language is detected over the whole decoded envelope, not
/// the extracted message; image attachments override it with
/// [`Language::Unknown`].
///
/// | shape | type | flow |
/// |-------|------|------|
/// | sequence, first part text, flow found | `SEQUENCE_OF_MESSAGE` | matched |
/// | sequence, first part text, no flow | `UNKNOWN_SEQUENCE_OF_MESSAGE` | `UNKNOWN` |
/// | single text with quick replies | `QUICK_REPLY` | matched or `UNKNOWN` |
/// | single text | `TEXT` | matched or `UNKNOWN` |
/// | single attachment | from [`classify_attachment`] | `UNKNOWN` |
/// | anything else | `UNKNOWN`, with a warning | `UNKNOWN` |
///
/// Trailing parts of a sequence are not represented in the record.
///
/// The channel type comes from the event; the directory is consulted only
/// when the event has no `channel_type` at all.
pub fn classify_bot(
    ctx: &ClassifyContext<'_>,
    event: &RawEvent,
    decoded: &str,
    user_id: &str,
) -> Result<Classified> {
    let content = BotContent::parse(decoded)?;
    let language = detect_language(decoded);
    let parts = content.parts();

    let (body, warning) = match content {
        BotContent::Sequence {
            first: BotPart::Text { text, .. },
            ..
        } => {
            let flow = ctx.flows.find(&text).map(str::to_string);
            let message_type = if flow.is_some() {
                MessageType::SequenceOfMessage
            } else {
                MessageType::UnknownSequenceOfMessage
            };
            (MessageBody::new(message_type, text, language).with_flow(flow), None)
        }
        BotContent::Single(BotPart::Text {
            text,
            quick_replies,
        }) => {
            let flow = ctx.flows.find(&text).map(str::to_string);
            let message_type = if quick_replies > 0 {
                MessageType::QuickReply
            } else {
                MessageType::Text
            };
            (MessageBody::new(message_type, text, language).with_flow(flow), None)
        }
        BotContent::Single(BotPart::Attachment(attachment)) => {
            let (message_type, text) = classify_attachment(&attachment)?;
            let language = if message_type == MessageType::Image {
                Language::Unknown
            } else {
                language
            };
            (MessageBody::new(message_type, text, language), None)
        }
        BotContent::Sequence {
            first: BotPart::Attachment(_),
            ..
        } => fallback(language, parts, "first sub-message is an attachment"),
        BotContent::Sequence {
            first: BotPart::Unrecognized,
            ..
        }
        | BotContent::Single(BotPart::Unrecognized) => {
            fallback(language, parts, "sub-message has neither text nor attachment")
        }
        BotContent::Empty => fallback(language, parts, "no sub-messages"),
    };

    let channel_type = match (&event.channel_type, ctx.directory.resolve(&event.channel_id)) {
        (Some(channel_type), _) => channel_type.as_str(),
        (None, Some(channel_type)) => channel_type,
        (None, None) => return Err(ChatnormError::unresolved_channel(&event.channel_id)),
    };

    Ok(Classified {
        record: NormalizedRecord::new(event, user_id, body, channel_type)?,
        warning,
    })
}

fn fallback(
    language: Language,
    parts: usize,
    reason: &str,
) -> (MessageBody, Option<ChatnormError>) {
    (
        MessageBody::new(MessageType::Unknown, String::new(), language),
        Some(ChatnormError::malformed_sequence(parts, reason)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::FlowMatcher;
    use crate::core::models::{ChannelDescriptor, ChannelDirectory, EventSource, FlowRule};

    fn classify(payload: &str) -> Result<Classified> {
        let directory = ChannelDirectory::default();
        let flows = FlowMatcher::new(&[
            FlowRule::new("BOOKING", ["book.*room"]),
            FlowRule::new("GREETING", ["สวัสดี", "(?i)hello"]),
        ])
        .unwrap();
        let ctx = ClassifyContext::new(&directory, &flows);
        let event = RawEvent::from_payload("ch-1", 1705314600000, EventSource::Automation, payload)
            .with_channel_type("FACEBOOK");
        classify_bot(&ctx, &event, payload, "u1")
    }

    #[test]
    fn test_single_text_with_flow() {
        let out = classify(r#"[{"message": {"text": "book a room"}}]"#).unwrap();
        assert!(out.warning.is_none());
        assert_eq!(out.record.message_type, MessageType::Text);
        assert_eq!(out.record.message, "book a room");
        assert_eq!(out.record.flow, "BOOKING");
        assert_eq!(out.record.channel_type, "FACEBOOK");
    }

    #[test]
    fn test_single_text_without_flow() {
        let out = classify(r#"[{"text": "see you"}]"#).unwrap();
        assert_eq!(out.record.message_type, MessageType::Text);
        assert_eq!(out.record.flow, "UNKNOWN");
    }

    #[test]
    fn test_quick_reply_needs_entries() {
        let out = classify(r#"[{"message": {"text": "Hello!", "quickReplies": [{"title": "A"}]}}]"#)
            .unwrap();
        assert_eq!(out.record.message_type, MessageType::QuickReply);
        assert_eq!(out.record.flow, "GREETING");

        let out = classify(r#"[{"message": {"text": "Hello!", "quickReplies": []}}]"#).unwrap();
        assert_eq!(out.record.message_type, MessageType::Text);
    }

    #[test]
    fn test_sequence_with_flow() {
        let out = classify(
            r#"[{"message": {"text": "สวัสดีค่ะ"}}, {"message": {"attachment": {"type": "image", "payload": {"url": "u"}}}}]"#,
        )
        .unwrap();
        assert_eq!(out.record.message_type, MessageType::SequenceOfMessage);
        assert_eq!(out.record.message, "สวัสดีค่ะ");
        assert_eq!(out.record.flow, "GREETING");
        assert_eq!(out.record.language, Language::Thai);
    }

    #[test]
    fn test_sequence_without_flow() {
        let out = classify(r#"[{"message": {"text": "one"}}, {"message": {"text": "two"}}]"#)
            .unwrap();
        assert_eq!(out.record.message_type, MessageType::UnknownSequenceOfMessage);
        assert_eq!(out.record.message, "one");
        assert_eq!(out.record.flow, "UNKNOWN");
    }

    #[test]
    fn test_image_forces_unknown_language() {
        let out = classify(
            r#"[{"attachment": {"type": "image", "payload": {"url": "http://x/y.jpg"}}}]"#,
        )
        .unwrap();
        assert_eq!(out.record.message_type, MessageType::Image);
        assert_eq!(out.record.language, Language::Unknown);
        assert_eq!(out.record.message, "<IMAGE ATTACHMENT:http://x/y.jpg>");
    }

    #[test]
    fn test_template_keeps_envelope_language() {
        let out = classify(
            r#"[{"message": {"attachment": {"type": "template", "payload": {"templateType": "generic"}}}}]"#,
        )
        .unwrap();
        assert_eq!(out.record.message_type, MessageType::GenericTemplate);
        assert_eq!(out.record.message, "<TEMPLATE>");
        // Field names in the envelope are Latin letters.
        assert_eq!(out.record.language, Language::Eng);
    }

    #[test]
    fn test_language_comes_from_envelope() {
        // The message is Latin-only but a later part is Thai.
        let out = classify(r#"[{"message": {"text": "menu"}}, {"message": {"text": "เมนู"}}]"#)
            .unwrap();
        assert_eq!(out.record.message, "menu");
        assert_eq!(out.record.language, Language::Thai);
    }

    #[test]
    fn test_malformed_sequence_falls_back() {
        let out = classify(r#"[{"message": {"sticker": 1}}, {"message": {"text": "x"}}]"#).unwrap();
        assert_eq!(out.record.message_type, MessageType::Unknown);
        assert_eq!(out.record.message, "");
        assert_eq!(out.record.flow, "UNKNOWN");
        let warning = out.warning.unwrap();
        assert!(warning.is_malformed_sequence());
    }

    #[test]
    fn test_sequence_starting_with_attachment_falls_back() {
        let out = classify(
            r#"[{"message": {"attachment": {"type": "image", "payload": {"url": "u"}}}}, {"message": {"text": "book a room"}}]"#,
        )
        .unwrap();
        assert_eq!(out.record.message_type, MessageType::Unknown);
        assert!(out.warning.unwrap().is_malformed_sequence());
    }

    #[test]
    fn test_empty_list_falls_back() {
        let out = classify("[]").unwrap();
        assert_eq!(out.record.message_type, MessageType::Unknown);
        assert_eq!(out.record.language, Language::Unknown);
        assert!(out.warning.is_some());
    }

    #[test]
    fn test_channel_type_falls_back_to_directory() {
        let directory = ChannelDirectory::new(vec![ChannelDescriptor::new("ch-1", "LINE")]);
        let flows = FlowMatcher::default();
        let ctx = ClassifyContext::new(&directory, &flows);
        let payload = r#"[{"text": "hi"}]"#;

        let event = RawEvent::from_payload("ch-1", 0, EventSource::Automation, payload);
        let out = classify_bot(&ctx, &event, payload, "u1").unwrap();
        assert_eq!(out.record.channel_type, "LINE");

        let event = RawEvent::from_payload("ch-2", 0, EventSource::Automation, payload);
        let err = classify_bot(&ctx, &event, payload, "u1").unwrap_err();
        assert!(err.is_unresolved_channel());
    }
}
