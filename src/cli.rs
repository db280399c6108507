//! Command-line interface definition using clap.

use clap::Parser;

use crate::config::ErrorPolicy;
use crate::error::Result;
use crate::format::OutputFormat;

/// Normalize raw chatbot conversation events into flat message records.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatnorm")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatnorm raw.jsonl --rules flow_rules.json
    chatnorm raw.jsonl -r flow_rules.json -f csv -o records.csv
    chatnorm raw.jsonl --on-error skip --parallel
    RUST_LOG=debug chatnorm raw.jsonl")]
pub struct Args {
    /// Path to the raw event rows (JSON Lines)
    pub input: String,

    /// Path to the flow rule set (JSON array of {flow, regexes})
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<String>,

    /// Path to a channel list (JSON array of {channel_id, channel_type});
    /// derived from bot rows when omitted
    #[arg(long, value_name = "FILE")]
    pub channels: Option<String>,

    /// Path to output file [default: normalized.<format extension>]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format [default: from the output extension, else jsonl]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// What to do when a single event cannot be decoded or classified
    #[arg(long, value_enum, default_value = "abort")]
    pub on_error: ErrorPolicy,

    /// Process users in parallel
    #[arg(long)]
    pub parallel: bool,
}

impl Args {
    /// Output format: `-f` if given, else inferred from `-o`, else JSONL.
    pub fn output_format(&self) -> Result<OutputFormat> {
        match (self.format, &self.output) {
            (Some(format), _) => Ok(format),
            (None, Some(path)) => OutputFormat::from_path(path),
            (None, None) => Ok(OutputFormat::default()),
        }
    }

    /// Output path, defaulting to `normalized.<ext>`.
    pub fn output_path(&self, format: OutputFormat) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("normalized.{}", format.extension()))
    }
}
