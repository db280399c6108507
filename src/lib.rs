//! # Chatnorm
//!
//! A Rust library for normalizing raw chatbot conversation events into flat,
//! analysis-ready message records.
//!
//! ## Overview
//!
//! Each raw event carries a base64-encoded JSON payload sent either by a
//! human user or by the automation (bot). Chatnorm decodes every payload,
//! orders each user's events in time, classifies them, and emits one
//! [`NormalizedRecord`] per event:
//!
//! - **Message type** - quick reply, text, attachment, image, templates,
//!   bot message sequences
//! - **Language** - Thai, English, or unknown, by script
//! - **Flow** - the conversation flow a bot message belongs to, from an
//!   ordered list of regex rules
//! - **Timestamps** - UTC and Asia/Bangkok local time
//! - **Channel type** - resolved through a channel directory
//!
//! ## Quick Start
//!
//! ```rust
//! use chatnorm::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let channels = vec![ChannelDescriptor::new("ch-1", "LINE")];
//!     let rules = vec![FlowRule::new("GREETING", ["^hello"])];
//!
//!     let mut users = UserEvents::new();
//!     users.insert("u1".into(), vec![
//!         RawEvent::from_payload("ch-1", 1_705_314_600_000, EventSource::Human, r#"{"text": "สวัสดี"}"#),
//!         RawEvent::from_payload("ch-1", 1_705_314_601_000, EventSource::Automation, r#"[{"text": "hello there"}]"#)
//!             .with_channel_type("LINE"),
//!     ]);
//!
//!     let records = normalize(channels, &rules, &users)?;
//!     assert_eq!(records[0].language, Language::Thai);
//!     assert_eq!(records[1].flow, "GREETING");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`core`] - Core types and the pipeline
//!   - [`core::models`] - [`RawEvent`](core::RawEvent), [`ChannelDirectory`](core::ChannelDirectory), [`FlowRule`](core::FlowRule)
//!   - [`core::processor`] - [`Pipeline`](core::Pipeline), [`ProcessingStats`](core::ProcessingStats), [`normalize`](core::normalize)
//!   - [`core::output`] - CSV, JSON and JSONL writers
//! - [`parsing`] - Base64 decoding and payload shapes
//! - [`classify`] - Language, flow, attachment, user and bot classifiers
//! - [`record`] - [`NormalizedRecord`] and its enumerations
//! - [`ingest`] - Reading ingestion-table rows, channel lists and flow rules
//! - [`config`] - [`PipelineConfig`](config::PipelineConfig), [`ErrorPolicy`](config::ErrorPolicy)
//! - [`format`] - [`OutputFormat`](format::OutputFormat) selection
//! - [`error`] - Unified error types ([`ChatnormError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod ingest;
pub mod parsing;
pub mod record;

// Re-export the main types at the crate root for convenience
pub use error::{ChatnormError, Result};
pub use record::NormalizedRecord;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatnorm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::NormalizedRecord;

    // Error types
    pub use crate::error::{ChatnormError, Result};

    // Configuration
    pub use crate::config::{ErrorPolicy, PipelineConfig};

    // Inputs
    pub use crate::core::models::{
        ChannelDescriptor, ChannelDirectory, EventSource, FlowRule, RawEvent,
    };

    // Pipeline
    pub use crate::core::processor::{
        Normalized, Pipeline, ProcessingStats, UserEvents, normalize,
    };

    // Record enumerations
    pub use crate::record::{Language, MessageBody, MessageType};

    // Output
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};
    #[cfg(feature = "json-output")]
    pub use crate::core::output::{to_json, to_jsonl, write_json, write_jsonl};
    pub use crate::format::{OutputFormat, to_format_string, write_to_format};
}
