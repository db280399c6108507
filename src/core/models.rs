//! Input data models: raw events, channel directory and flow rules.
//!
//! These are owned by the caller and only read by the pipeline.

use serde::{Deserialize, Serialize};

use crate::parsing::encode_payload;

/// Which side of the conversation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    /// A person typing into the channel
    #[serde(rename = "user", alias = "human")]
    Human,
    /// The bot answering
    #[serde(rename = "bot", alias = "automation")]
    Automation,
}

impl EventSource {
    /// Returns the wire name (`user` / `bot`).
    pub fn as_str(self) -> &'static str {
        match self {
            EventSource::Human => "user",
            EventSource::Automation => "bot",
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One raw conversation event as read from the ingestion table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub channel_id: String,

    /// Epoch milliseconds
    #[serde(rename = "timestamp", alias = "timestamp_ms")]
    pub timestamp_ms: i64,

    pub source: EventSource,

    #[serde(default)]
    pub interact_with: String,

    /// Base64-encoded UTF-8 JSON body
    #[serde(rename = "message", alias = "encoded_payload")]
    pub encoded_payload: String,

    /// Set on bot events; user events are resolved through the directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<String>,
}

impl RawEvent {
    /// Creates an event from an already-encoded payload.
    pub fn new(
        channel_id: impl Into<String>,
        timestamp_ms: i64,
        source: EventSource,
        encoded_payload: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            timestamp_ms,
            source,
            interact_with: String::new(),
            encoded_payload: encoded_payload.into(),
            channel_type: None,
        }
    }

    /// Creates an event by base64-encoding a plain JSON body.
    pub fn from_payload(
        channel_id: impl Into<String>,
        timestamp_ms: i64,
        source: EventSource,
        payload: &str,
    ) -> Self {
        Self::new(channel_id, timestamp_ms, source, encode_payload(payload))
    }

    /// Builder-style method to set the counterpart of the conversation.
    #[must_use]
    pub fn with_interact_with(mut self, interact_with: impl Into<String>) -> Self {
        self.interact_with = interact_with.into();
        self
    }

    /// Builder-style method to set the channel type.
    #[must_use]
    pub fn with_channel_type(mut self, channel_type: impl Into<String>) -> Self {
        self.channel_type = Some(channel_type.into());
        self
    }

    pub fn is_from_human(&self) -> bool {
        self.source == EventSource::Human
    }
}

/// A `{channel_id, channel_type}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub channel_id: String,
    pub channel_type: String,
}

impl ChannelDescriptor {
    pub fn new(channel_id: impl Into<String>, channel_type: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_type: channel_type.into(),
        }
    }
}

/// Read-only channel lookup table.
///
/// Lookups return the first descriptor with a matching id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelDirectory {
    channels: Vec<ChannelDescriptor>,
}

impl ChannelDirectory {
    pub fn new(channels: Vec<ChannelDescriptor>) -> Self {
        Self { channels }
    }

    /// Returns the channel type registered for `channel_id`.
    pub fn resolve(&self, channel_id: &str) -> Option<&str> {
        self.channels
            .iter()
            .find(|ch| ch.channel_id == channel_id)
            .map(|ch| ch.channel_type.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelDescriptor> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl FromIterator<ChannelDescriptor> for ChannelDirectory {
    fn from_iter<I: IntoIterator<Item = ChannelDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A named flow and the ordered patterns that detect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRule {
    #[serde(rename = "flow", alias = "flow_name")]
    pub flow_name: String,
    pub regexes: Vec<String>,
}

impl FlowRule {
    pub fn new<I, S>(flow_name: impl Into<String>, regexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flow_name: flow_name.into(),
            regexes: regexes.into_iter().map(Into::into).collect(),
        }
    }
}
