//! Turning ingestion-table rows into pipeline inputs.
//!
//! The table is read as JSON Lines, one row per event. Rows carry both
//! participants (`sender_id`, `recipient_id`) besides the event itself;
//! the user is the sender of user rows and the recipient of bot rows.
//!
//! ```json
//! {"sender_id":"u1","recipient_id":"page","channel_id":"ch-1","timestamp":1705314600000,"source":"user","interact_with":"page","message":"eyJ0ZXh0IjoiaGkifQ=="}
//! {"sender_id":"page","recipient_id":"u1","channel_id":"ch-1","channel_type":"FACEBOOK","timestamp":1705314601000,"source":"bot","interact_with":"u1","message":"W3sidGV4dCI6ImhpIn1d"}
//! ```
//!
//! Rows the reader flagged with `_corrupt_record` are dropped.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::core::models::{ChannelDescriptor, ChannelDirectory, EventSource, FlowRule, RawEvent};
use crate::core::processor::UserEvents;
use crate::error::{ChatnormError, Result};

const CORRUPT_MARKER: &str = "_corrupt_record";

/// One ingestion-table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(flatten)]
    pub event: RawEvent,
}

impl TableRow {
    /// The human side of the conversation.
    pub fn user_id(&self) -> Option<&str> {
        match self.event.source {
            EventSource::Human => self.sender_id.as_deref(),
            EventSource::Automation => self.recipient_id.as_deref(),
        }
    }
}

/// Rows read from a table dump.
#[derive(Debug, Clone, Default)]
pub struct TableRows {
    pub rows: Vec<TableRow>,
    /// Rows dropped for carrying `_corrupt_record`
    pub corrupt: usize,
}

/// Parses JSON Lines rows, skipping blank lines and corrupt rows.
pub fn parse_rows<R: BufRead>(reader: R) -> Result<TableRows> {
    let mut out = TableRows::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value =
            serde_json::from_str(&line).map_err(|e| ChatnormError::json_parse("table row", e))?;
        if value.get(CORRUPT_MARKER).is_some() {
            out.corrupt += 1;
            continue;
        }

        let row = serde_json::from_value(value).map_err(|e| {
            ChatnormError::shape("table row", format!("line {}: {}", index + 1, e))
        })?;
        out.rows.push(row);
    }

    if out.corrupt > 0 {
        warn!(corrupt = out.corrupt, "dropped corrupt rows");
    }
    info!(rows = out.rows.len(), "read table rows");
    Ok(out)
}

/// Reads rows from a JSON Lines file.
pub fn read_rows(path: &Path) -> Result<TableRows> {
    let file = File::open(path)?;
    parse_rows(BufReader::new(file))
}

/// Groups row events by user, keeping row order within each user.
pub fn group_by_user(rows: Vec<TableRow>) -> Result<UserEvents> {
    let mut users = UserEvents::new();

    for row in rows {
        let Some(user_id) = row.user_id().map(str::to_string) else {
            return Err(ChatnormError::shape(
                "table row",
                format!(
                    "{} row at {} has no {}",
                    row.event.source,
                    row.event.timestamp_ms,
                    match row.event.source {
                        EventSource::Human => "sender_id",
                        EventSource::Automation => "recipient_id",
                    }
                ),
            ));
        };
        users.entry(user_id).or_default().push(row.event);
    }

    Ok(users)
}

/// Builds the channel directory from bot rows.
///
/// Keeps the first channel seen for each distinct channel type.
pub fn channel_directory(rows: &[TableRow]) -> ChannelDirectory {
    let mut seen = HashSet::new();

    rows.iter()
        .map(|row| &row.event)
        .filter(|event| event.source == EventSource::Automation)
        .filter_map(|event| {
            let channel_type = event.channel_type.as_deref()?;
            seen.insert(channel_type.to_string())
                .then(|| ChannelDescriptor::new(&event.channel_id, channel_type))
        })
        .collect()
}

/// Loads a channel directory from a JSON array of
/// `{"channel_id": .., "channel_type": ..}`.
pub fn load_channels(path: &Path) -> Result<ChannelDirectory> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| ChatnormError::json_parse("channel list", e))
}

/// Parses a flow rule set: a JSON array of `{"flow": .., "regexes": [..]}`.
pub fn parse_flow_rules(json: &str) -> Result<Vec<FlowRule>> {
    serde_json::from_str(json).map_err(|e| ChatnormError::json_parse("flow rules", e))
}

/// Loads a flow rule set from a file.
pub fn load_flow_rules(path: &Path) -> Result<Vec<FlowRule>> {
    let json = std::fs::read_to_string(path)?;
    parse_flow_rules(&json)
}
