//! JSON Lines (JSONL) output writer.
//!
//! One record per line; the natural shape for loading into a warehouse
//! table or streaming into another job.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::Result;
use crate::record::NormalizedRecord;

/// Writes records to JSONL (JSON Lines) format.
///
/// Each line is a valid JSON object:
/// ```jsonl
/// {"id":"...","channel_id":"ch-1","user_id":"u1","type":"TEXT",...}
/// {"id":"...","channel_id":"ch-1","user_id":"u1","type":"IMAGE",...}
/// ```
pub fn write_jsonl(records: &[NormalizedRecord], output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    write_lines(records, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Converts records to a JSONL string.
pub fn to_jsonl(records: &[NormalizedRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_lines(records, &mut buffer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_lines<W: Write>(records: &[NormalizedRecord], writer: &mut W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
