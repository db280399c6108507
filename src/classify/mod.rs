//! Message classification.
//!
//! - [`language`] - Thai / English / unknown script detection
//! - [`flow`] - ordered regex rules to flow names
//! - [`attachment`] - bot attachment display types
//! - [`user`] - records for human-originated events
//! - [`bot`] - records for bot-originated events
//!
//! Both classifiers read the run's lookup tables through a
//! [`ClassifyContext`] and return explicit results; the pipeline decides
//! what a failure means for the run.

pub mod attachment;
pub mod bot;
pub mod flow;
pub mod language;
pub mod user;

use crate::core::models::{ChannelDirectory, RawEvent};
use crate::error::{ChatnormError, Result};
use crate::record::NormalizedRecord;

pub use attachment::classify_attachment;
pub use bot::classify_bot;
pub use flow::FlowMatcher;
pub use language::detect_language;
pub use user::classify_user;

/// Read-only lookup tables shared by every classification in a run.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    pub directory: &'a ChannelDirectory,
    pub flows: &'a FlowMatcher,
}

impl<'a> ClassifyContext<'a> {
    pub fn new(directory: &'a ChannelDirectory, flows: &'a FlowMatcher) -> Self {
        Self { directory, flows }
    }
}

/// A classified record, plus a warning if it is a fallback.
#[derive(Debug)]
pub struct Classified {
    pub record: NormalizedRecord,
    pub warning: Option<ChatnormError>,
}

impl From<NormalizedRecord> for Classified {
    fn from(record: NormalizedRecord) -> Self {
        Self {
            record,
            warning: None,
        }
    }
}

/// Classifies one decoded event with the classifier for its source.
pub fn classify_event(
    ctx: &ClassifyContext<'_>,
    event: &RawEvent,
    decoded: &str,
    user_id: &str,
) -> Result<Classified> {
    if event.is_from_human() {
        classify_user(ctx, event, decoded, user_id).map(Classified::from)
    } else {
        classify_bot(ctx, event, decoded, user_id)
    }
}
