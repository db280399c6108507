//! Unified error types for chatnorm.
//!
//! This module provides a single [`ChatnormError`] enum that covers all error
//! cases in the library, from payload decoding through record output.
//!
//! # Per-event vs. per-run errors
//!
//! - **Per-event** errors ([`Decode`](ChatnormError::Decode),
//!   [`Parse`](ChatnormError::Parse),
//!   [`UnresolvedChannel`](ChatnormError::UnresolvedChannel),
//!   [`InvalidTimestamp`](ChatnormError::InvalidTimestamp)) are raised while
//!   classifying a single event. The pipeline wraps them with
//!   [`in_event`](ChatnormError::in_event) and then applies the configured
//!   [`ErrorPolicy`](crate::config::ErrorPolicy).
//! - **Per-run** errors ([`InvalidPattern`](ChatnormError::InvalidPattern),
//!   [`Io`](ChatnormError::Io), ...) abort before or after classification.
//! - [`MalformedSequence`](ChatnormError::MalformedSequence) is only ever a
//!   warning; it travels alongside a fallback record.

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatnorm operations.
///
/// # Example
///
/// ```rust
/// use chatnorm::error::Result;
/// use chatnorm::NormalizedRecord;
///
/// fn my_function() -> Result<Vec<NormalizedRecord>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatnormError>;

/// The error type for all chatnorm operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatnormError {
    /// An I/O error occurred while reading inputs or writing output.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The event payload is not valid base64, or does not decode to UTF-8.
    #[error("Failed to decode payload: {source}")]
    Decode {
        #[source]
        source: DecodeErrorKind,
    },

    /// The decoded payload is not valid JSON or has an unexpected shape.
    #[error("Failed to parse {what}: {source}")]
    Parse {
        /// What was being parsed (e.g., "user payload", "flow rules")
        what: &'static str,
        #[source]
        source: ParseErrorKind,
    },

    /// No channel descriptor matches the event's channel id.
    #[error("No channel registered for channel id '{channel_id}'")]
    UnresolvedChannel { channel_id: String },

    /// A bot turn whose sub-messages have no recognizable text or attachment.
    #[error("Malformed bot sequence of {parts} part(s): {reason}")]
    MalformedSequence { parts: usize, reason: String },

    /// The epoch milliseconds cannot be represented as a date.
    #[error("Timestamp {timestamp_ms} ms is out of range")]
    InvalidTimestamp { timestamp_ms: i64 },

    /// A flow rule pattern failed to compile.
    #[error("Invalid pattern '{pattern}' in flow '{flow}': {source}")]
    InvalidPattern {
        flow: String,
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    /// The input or output format is not what was expected.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        format: &'static str,
        message: String,
    },

    /// JSON serialization error while writing output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A per-event error, tagged with the event it came from.
    #[error("Event of user '{user_id}' at {timestamp_ms}: {source}")]
    Event {
        user_id: String,
        timestamp_ms: i64,
        #[source]
        source: Box<ChatnormError>,
    },
}

/// Kinds of payload decoding failures.
#[derive(Debug, Error)]
pub enum DecodeErrorKind {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Kinds of parse errors that can occur.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// JSON syntax or type error
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Valid JSON that does not match any known payload shape
    #[error("{0}")]
    Shape(String),
}

impl From<base64::DecodeError> for ChatnormError {
    fn from(err: base64::DecodeError) -> Self {
        ChatnormError::Decode {
            source: DecodeErrorKind::Base64(err),
        }
    }
}

impl From<std::string::FromUtf8Error> for ChatnormError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ChatnormError::Decode {
            source: DecodeErrorKind::Utf8(err),
        }
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatnormError {
    /// Creates a JSON parse error for the given payload kind.
    pub fn json_parse(what: &'static str, source: serde_json::Error) -> Self {
        ChatnormError::Parse {
            what,
            source: ParseErrorKind::Json(source),
        }
    }

    /// Creates a shape error: valid JSON, wrong structure.
    pub fn shape(what: &'static str, message: impl Into<String>) -> Self {
        ChatnormError::Parse {
            what,
            source: ParseErrorKind::Shape(message.into()),
        }
    }

    /// Creates an unresolved channel error.
    pub fn unresolved_channel(channel_id: impl Into<String>) -> Self {
        ChatnormError::UnresolvedChannel {
            channel_id: channel_id.into(),
        }
    }

    /// Creates a malformed sequence warning.
    pub fn malformed_sequence(parts: usize, reason: impl Into<String>) -> Self {
        ChatnormError::MalformedSequence {
            parts,
            reason: reason.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatnormError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Wraps this error with the user and timestamp of the failing event.
    ///
    /// Already-wrapped errors are returned unchanged.
    #[must_use]
    pub fn in_event(self, user_id: impl Into<String>, timestamp_ms: i64) -> Self {
        match self {
            ChatnormError::Event { .. } => self,
            other => ChatnormError::Event {
                user_id: user_id.into(),
                timestamp_ms,
                source: Box::new(other),
            },
        }
    }

    /// Returns the underlying error, looking through the per-event wrapper.
    pub fn kind(&self) -> &ChatnormError {
        match self {
            ChatnormError::Event { source, .. } => source.kind(),
            other => other,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self.kind(), ChatnormError::Io(_))
    }

    /// Returns `true` if the payload could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self.kind(), ChatnormError::Decode { .. })
    }

    /// Returns `true` if the payload could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind(), ChatnormError::Parse { .. })
    }

    /// Returns `true` if a channel id could not be resolved.
    pub fn is_unresolved_channel(&self) -> bool {
        matches!(self.kind(), ChatnormError::UnresolvedChannel { .. })
    }

    /// Returns `true` if this is a malformed sequence warning.
    pub fn is_malformed_sequence(&self) -> bool {
        matches!(self.kind(), ChatnormError::MalformedSequence { .. })
    }
}
