//! Tagged payload shapes.
//!
//! User payloads are a single JSON object:
//!
//! ```json
//! {"text": "hello"}
//! {"quick_reply": {"payload": "YES"}, "text": "Yes"}
//! {"attachments": [{"type": "image", "payload": {"url": "..."}}]}
//! ```
//!
//! Bot payloads are a list of sub-messages, each usually wrapped in a
//! `message` object:
//!
//! ```json
//! [{"message": {"text": "Hi!", "quickReplies": [{"title": "Menu"}]}}]
//! [{"message": {"attachment": {"type": "image", "payload": {"url": "..."}}}}]
//! ```
//!
//! Bare sub-message objects (without the `message` wrapper) are accepted too.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ChatnormError, Result};

/// What a user event carries, by priority of detection.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    /// A tap on a suggested reply; `text` is the button label
    QuickReply { text: String },
    /// One or more uploaded attachments, kept as raw JSON
    Attachments(Value),
    /// A typed message
    Text(String),
    /// None of the above
    Unrecognized(String),
}

impl UserContent {
    /// Parses a decoded user payload.
    ///
    /// Only invalid JSON or a non-object root is an error; a missing `text`
    /// is reported as [`UserContent::Unrecognized`].
    pub fn parse(decoded: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(decoded)
            .map_err(|e| ChatnormError::json_parse("user payload", e))?;
        let Value::Object(obj) = value else {
            return Err(ChatnormError::shape(
                "user payload",
                "expected a JSON object",
            ));
        };

        Ok(Self::from_object(obj))
    }

    fn from_object(mut obj: Map<String, Value>) -> Self {
        if obj.contains_key("quick_reply") {
            return match take_text(&mut obj) {
                Some(text) => UserContent::QuickReply { text },
                None => UserContent::Unrecognized("quick reply without text".into()),
            };
        }

        if let Some(attachments) = obj.remove("attachments") {
            return UserContent::Attachments(attachments);
        }

        match take_text(&mut obj) {
            Some(text) => UserContent::Text(text),
            None => UserContent::Unrecognized("no text, quick reply or attachments".into()),
        }
    }
}

/// A bot turn: one sub-message, or a sequence of several.
#[derive(Debug, Clone, PartialEq)]
pub enum BotContent {
    /// An empty list
    Empty,
    /// Exactly one sub-message
    Single(BotPart),
    /// More than one sub-message; only the first is kept
    Sequence { parts: usize, first: BotPart },
}

impl BotContent {
    /// Parses a decoded bot payload.
    pub fn parse(decoded: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(decoded)
            .map_err(|e| ChatnormError::json_parse("bot payload", e))?;
        let Value::Array(parts) = value else {
            return Err(ChatnormError::shape(
                "bot payload",
                "expected a list of sub-messages",
            ));
        };

        let count = parts.len();
        let Some(first) = parts.into_iter().next() else {
            return Ok(BotContent::Empty);
        };
        if count == 1 {
            return Ok(BotContent::Single(BotPart::from_value(first)?));
        }

        // A sequence never classifies its attachments, so a broken one only
        // makes the first part unrecognized.
        let first = BotPart::from_value(first).unwrap_or(BotPart::Unrecognized);
        Ok(BotContent::Sequence {
            parts: count,
            first,
        })
    }

    /// Number of sub-messages in the turn.
    pub fn parts(&self) -> usize {
        match self {
            BotContent::Empty => 0,
            BotContent::Single(_) => 1,
            BotContent::Sequence { parts, .. } => *parts,
        }
    }
}

/// A single bot sub-message.
#[derive(Debug, Clone, PartialEq)]
pub enum BotPart {
    /// Text, optionally offering quick replies
    Text { text: String, quick_replies: usize },
    /// A rich attachment (image, template, ...)
    Attachment(AttachmentPayload),
    /// Neither text nor attachment
    Unrecognized,
}

impl BotPart {
    fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut obj) = value else {
            return Ok(BotPart::Unrecognized);
        };

        // Unwrap `{"message": {...}}`
        if matches!(obj.get("message"), Some(Value::Object(_))) {
            if let Some(Value::Object(inner)) = obj.remove("message") {
                obj = inner;
            }
        }

        if obj.contains_key("text") {
            let quick_replies = obj
                .get("quickReplies")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            return Ok(match take_text(&mut obj) {
                Some(text) => BotPart::Text {
                    text,
                    quick_replies,
                },
                None => BotPart::Unrecognized,
            });
        }

        if let Some(attachment) = obj.remove("attachment") {
            let attachment = serde_json::from_value(attachment)
                .map_err(|e| ChatnormError::json_parse("bot attachment", e))?;
            return Ok(BotPart::Attachment(attachment));
        }

        Ok(BotPart::Unrecognized)
    }
}

/// A bot-side attachment: `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttachmentPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl AttachmentPayload {
    /// Reads a string field from the payload body.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

fn take_text(obj: &mut Map<String, Value>) -> Option<String> {
    match obj.remove("text") {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}
