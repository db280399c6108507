//! JSON output writer.

use std::fs::File;
use std::io::Write;

use crate::error::Result;
use crate::record::NormalizedRecord;

/// Writes records to a JSON file as a pretty-printed array.
pub fn write_json(records: &[NormalizedRecord], output_path: &str) -> Result<()> {
    let json = to_json(records)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts records to a JSON array string.
///
/// Same format as `write_json`, but returns a String instead of writing to file.
pub fn to_json(records: &[NormalizedRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
