//! The normalization pipeline.
//!
//! For every user: decode each event, sort chronologically, classify, and
//! append the records to one flat output. Users are independent, so with the
//! `parallel` feature they can be processed on a rayon pool.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::classify::{ClassifyContext, FlowMatcher, classify_event};
use crate::config::{ErrorPolicy, PipelineConfig};
use crate::core::models::{ChannelDescriptor, ChannelDirectory, FlowRule, RawEvent};
use crate::error::{ChatnormError, Result};
use crate::parsing::decode_payload;
use crate::record::NormalizedRecord;

/// Raw events keyed by user id, in arbitrary order within each user.
pub type UserEvents = BTreeMap<String, Vec<RawEvent>>;

/// Anything that happened at an epoch-millisecond instant.
pub trait Timestamped {
    fn timestamp_ms(&self) -> i64;
}

impl Timestamped for RawEvent {
    fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}

/// Sorts by timestamp ascending. Ties keep their input order.
pub fn sort_chronologically<T: Timestamped>(items: &mut [T]) {
    items.sort_by_key(|item| item.timestamp_ms());
}

/// An event whose payload has been decoded to text.
#[derive(Debug, Clone)]
pub struct DecodedEvent<'a> {
    pub event: &'a RawEvent,
    pub text: String,
}

impl Timestamped for DecodedEvent<'_> {
    fn timestamp_ms(&self) -> i64 {
        self.event.timestamp_ms
    }
}

/// Statistics about a normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub users: usize,
    pub events: usize,
    pub records: usize,
    /// Events dropped under [`ErrorPolicy::Skip`]
    pub skipped: usize,
    /// Records emitted as fallbacks for malformed bot turns
    pub warnings: usize,
}

impl ProcessingStats {
    fn absorb(&mut self, other: ProcessingStats) {
        self.users += other.users;
        self.events += other.events;
        self.records += other.records;
        self.skipped += other.skipped;
        self.warnings += other.warnings;
    }
}

/// Output of a run.
#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    pub stats: ProcessingStats,
    /// Per-event errors that were skipped rather than fatal
    pub skipped: Vec<ChatnormError>,
    /// Malformed bot turns that produced `UNKNOWN` fallback records
    pub warnings: Vec<ChatnormError>,
}

impl Normalized {
    fn absorb(&mut self, other: Normalized) {
        self.records.extend(other.records);
        self.stats.absorb(other.stats);
        self.skipped.extend(other.skipped);
        self.warnings.extend(other.warnings);
    }
}

/// A configured normalization run.
///
/// Holds the channel directory, the compiled flow rules and the config for
/// the lifetime of the run; nothing is global.
///
/// # Example
///
/// ```rust
/// use chatnorm::core::models::{ChannelDescriptor, ChannelDirectory, EventSource, FlowRule, RawEvent};
/// use chatnorm::core::processor::{Pipeline, UserEvents};
/// use chatnorm::config::PipelineConfig;
///
/// # fn main() -> chatnorm::Result<()> {
/// let directory = ChannelDirectory::new(vec![ChannelDescriptor::new("ch-1", "FACEBOOK")]);
/// let rules = vec![FlowRule::new("BOOKING", ["book.*room"])];
/// let pipeline = Pipeline::new(directory, &rules, PipelineConfig::new())?;
///
/// let mut users = UserEvents::new();
/// users.insert("u1".into(), vec![
///     RawEvent::from_payload("ch-1", 2_000, EventSource::Automation, r#"[{"text": "book a room"}]"#)
///         .with_channel_type("FACEBOOK"),
///     RawEvent::from_payload("ch-1", 1_000, EventSource::Human, r#"{"text": "hello"}"#),
/// ]);
///
/// let out = pipeline.run(&users)?;
/// assert_eq!(out.records.len(), 2);
/// assert_eq!(out.records[0].message, "hello");
/// assert_eq!(out.records[1].flow, "BOOKING");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    directory: ChannelDirectory,
    flows: FlowMatcher,
    config: PipelineConfig,
}

impl Pipeline {
    /// Compiles the flow rules and captures the run's inputs.
    pub fn new(
        directory: ChannelDirectory,
        rules: &[FlowRule],
        config: PipelineConfig,
    ) -> Result<Self> {
        Ok(Self {
            directory,
            flows: FlowMatcher::new(rules)?,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn context(&self) -> ClassifyContext<'_> {
        ClassifyContext::new(&self.directory, &self.flows)
    }

    /// Normalizes every user's events into one flat record list.
    ///
    /// Within a user, records follow event time. Across users, order follows
    /// the map unless users are processed in parallel.
    pub fn run(&self, users: &UserEvents) -> Result<Normalized> {
        info!(
            users = users.len(),
            channels = self.directory.len(),
            flows = self.flows.len(),
            policy = %self.config.error_policy,
            "normalizing events"
        );

        let outcomes = self.process_users(users)?;

        let mut out = Normalized::default();
        for outcome in outcomes {
            out.absorb(outcome);
        }

        info!(
            events = out.stats.events,
            records = out.stats.records,
            skipped = out.stats.skipped,
            warnings = out.stats.warnings,
            "normalization finished"
        );
        Ok(out)
    }

    #[cfg(feature = "parallel")]
    fn process_users(&self, users: &UserEvents) -> Result<Vec<Normalized>> {
        use rayon::prelude::*;

        if self.config.parallel {
            return users
                .par_iter()
                .map(|(user_id, events)| self.process_user(user_id, events))
                .collect();
        }
        self.process_users_sequential(users)
    }

    #[cfg(not(feature = "parallel"))]
    fn process_users(&self, users: &UserEvents) -> Result<Vec<Normalized>> {
        self.process_users_sequential(users)
    }

    fn process_users_sequential(&self, users: &UserEvents) -> Result<Vec<Normalized>> {
        users
            .iter()
            .map(|(user_id, events)| self.process_user(user_id, events))
            .collect()
    }

    /// Decodes, sorts and classifies one user's events.
    pub fn process_user(&self, user_id: &str, events: &[RawEvent]) -> Result<Normalized> {
        let mut out = Normalized {
            stats: ProcessingStats {
                users: 1,
                events: events.len(),
                ..ProcessingStats::default()
            },
            ..Normalized::default()
        };

        let mut decoded = Vec::with_capacity(events.len());
        for event in events {
            match decode_payload(&event.encoded_payload) {
                Ok(text) => decoded.push(DecodedEvent { event, text }),
                Err(e) => self.reject(&mut out, e.in_event(user_id, event.timestamp_ms))?,
            }
        }

        sort_chronologically(&mut decoded);

        let ctx = self.context();
        for DecodedEvent { event, text } in &decoded {
            match classify_event(&ctx, event, text, user_id) {
                Ok(classified) => {
                    if let Some(warning) = classified.warning {
                        let warning = warning.in_event(user_id, event.timestamp_ms);
                        warn!(error = %warning, "fallback record for malformed bot turn");
                        out.warnings.push(warning);
                    }
                    out.records.push(classified.record);
                }
                Err(e) => self.reject(&mut out, e.in_event(user_id, event.timestamp_ms))?,
            }
        }

        out.stats.records = out.records.len();
        out.stats.skipped = out.skipped.len();
        out.stats.warnings = out.warnings.len();
        debug!(user = user_id, records = out.stats.records, "user processed");
        Ok(out)
    }

    /// Applies the error policy to a failed event.
    fn reject(&self, out: &mut Normalized, err: ChatnormError) -> Result<()> {
        match self.config.error_policy {
            ErrorPolicy::Abort => Err(err),
            ErrorPolicy::Skip => {
                warn!(error = %err, "skipping event");
                out.skipped.push(err);
                Ok(())
            }
        }
    }
}

/// One-shot normalization with the default (abort) policy.
pub fn normalize(
    channels: Vec<ChannelDescriptor>,
    rules: &[FlowRule],
    users: &UserEvents,
) -> Result<Vec<NormalizedRecord>> {
    let pipeline = Pipeline::new(ChannelDirectory::new(channels), rules, PipelineConfig::new())?;
    Ok(pipeline.run(users)?.records)
}
