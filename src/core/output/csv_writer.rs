//! CSV output writer.

use std::fs::File;
use std::io::Write;

use chrono::SecondsFormat;

use crate::error::{ChatnormError, Result};
use crate::record::NormalizedRecord;

const HEADER: [&str; 12] = [
    "id",
    "channel_id",
    "user_id",
    "source",
    "interact_with",
    "type",
    "message",
    "language",
    "flow",
    "utc_timestamp",
    "thai_timestamp",
    "channel_type",
];

/// Writes records to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `id`, `channel_id`, `user_id`, `source`, `interact_with`,
///   `type`, `message`, `language`, `flow`, `utc_timestamp`,
///   `thai_timestamp`, `channel_type`
/// - Encoding: UTF-8
pub fn write_csv(records: &[NormalizedRecord], output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    write_records(records, file)
}

/// Converts records to a CSV string.
///
/// Same format as `write_csv`, but returns a String instead of writing to file.
pub fn to_csv(records: &[NormalizedRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(records, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| ChatnormError::invalid_format("CSV output", e.to_string()))
}

fn write_records<W: Write>(records: &[NormalizedRecord], sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(sink);

    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record(build_record(record))?;
    }

    writer.flush()?;
    Ok(())
}

/// Build CSV row for a single record.
fn build_record(record: &NormalizedRecord) -> [String; 12] {
    [
        record.record_id.to_string(),
        record.channel_id.clone(),
        record.user_id.clone(),
        record.source.as_str().to_string(),
        record.interact_with.clone(),
        record.message_type.as_str().to_string(),
        record.message.clone(),
        record.language.as_str().to_string(),
        record.flow.clone(),
        record
            .utc_timestamp
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        record
            .thai_timestamp
            .to_rfc3339_opts(SecondsFormat::AutoSi, false),
        record.channel_type.clone(),
    ]
}
