//! Core processing logic for chatnorm.
//!
//! This module contains:
//! - [`models`] - Input data: raw events, channel directory, flow rules
//! - [`processor`] - The normalization pipeline and its statistics
//! - [`output`] - Format writers (CSV, JSON, JSONL)
//!
//! # Quick Start
//!
//! ```rust
//! use chatnorm::core::{
//!     ChannelDirectory, FlowRule, Pipeline, ProcessingStats, RawEvent, UserEvents,
//! };
//! ```

pub mod models;
pub mod output;
pub mod processor;

// Re-export main types for convenience
pub use models::{ChannelDescriptor, ChannelDirectory, EventSource, FlowRule, RawEvent};
pub use processor::{Normalized, Pipeline, ProcessingStats, UserEvents, normalize};

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};
