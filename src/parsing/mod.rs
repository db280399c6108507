//! Payload decoding and shape detection.
//!
//! Raw events carry their body as base64-encoded UTF-8 JSON. This module
//! turns that into text ([`decode_payload`]) and then into one of the tagged
//! payload shapes in [`payload`], so the classifiers can match exhaustively
//! instead of probing optional fields.

pub mod payload;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

pub use payload::{AttachmentPayload, BotContent, BotPart, UserContent};

/// Decodes a base64 payload into UTF-8 text.
///
/// Surrounding whitespace is ignored; anything else that is not valid
/// standard base64 is an error.
pub fn decode_payload(encoded: &str) -> Result<String> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Encodes text the way raw events carry it.
pub fn encode_payload(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}
