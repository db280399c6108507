//! Output format writers.
//!
//! This module provides writers for normalized records:
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - JSON array of records - requires `json-output` feature
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines (one record per line) - requires `json-output` feature
//!
//! All formats carry the same columns. Timestamps are RFC 3339; the UTC
//! column ends in `Z`, the Thai column in `+07:00`.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn main() -> chatnorm::Result<()> {
//! use chatnorm::core::output::{write_csv, write_jsonl, to_json};
//! use chatnorm::NormalizedRecord;
//!
//! let records: Vec<NormalizedRecord> = Vec::new();
//!
//! write_csv(&records, "records.csv")?;
//! write_jsonl(&records, "records.jsonl")?;
//! let json = to_json(&records)?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-output", feature = "json-output")))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_jsonl, write_jsonl};
