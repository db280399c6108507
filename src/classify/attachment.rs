//! Bot attachment sub-classification.

use crate::error::{ChatnormError, Result};
use crate::parsing::AttachmentPayload;
use crate::record::MessageType;

pub const TEMPLATE_PLACEHOLDER: &str = "<TEMPLATE>";
pub const UNKNOWN_ATTACHMENT_PLACEHOLDER: &str = "<UNKNOWN ATTACHMENT>";

/// Maps an attachment to its display type and text.
///
/// | kind | condition | type | text |
/// |------|-----------|------|------|
/// | `template` | `templateType == "button"` | `BUTTON_TEMPLATE` | button text |
/// | `template` | otherwise | `GENERIC_TEMPLATE` | `<TEMPLATE>` |
/// | `image` | | `IMAGE` | `<IMAGE ATTACHMENT:{url}>` |
/// | other | | `UNKNOWN_ATTACHMENT` | `<UNKNOWN ATTACHMENT>` |
pub fn classify_attachment(attachment: &AttachmentPayload) -> Result<(MessageType, String)> {
    match attachment.kind.as_str() {
        "template" => {
            if attachment.payload_str("templateType") == Some("button") {
                let text = attachment.payload_str("text").ok_or_else(|| {
                    ChatnormError::shape("bot attachment", "button template without text")
                })?;
                Ok((MessageType::ButtonTemplate, text.to_string()))
            } else {
                Ok((MessageType::GenericTemplate, TEMPLATE_PLACEHOLDER.to_string()))
            }
        }
        "image" => {
            let url = attachment
                .payload_str("url")
                .ok_or_else(|| ChatnormError::shape("bot attachment", "image without url"))?;
            Ok((MessageType::Image, image_placeholder(url)))
        }
        _ => Ok((
            MessageType::UnknownAttachment,
            UNKNOWN_ATTACHMENT_PLACEHOLDER.to_string(),
        )),
    }
}

/// Placeholder text for an image attachment.
pub fn image_placeholder(url: &str) -> String {
    format!("<IMAGE ATTACHMENT:{url}>")
}
