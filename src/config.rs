//! Pipeline configuration.
//!
//! Everything a run needs besides its inputs lives in [`PipelineConfig`];
//! there is no process-wide state.
//!
//! # Example
//!
//! ```rust
//! use chatnorm::config::{ErrorPolicy, PipelineConfig};
//!
//! let config = PipelineConfig::new()
//!     .with_error_policy(ErrorPolicy::Skip)
//!     .with_parallel(true);
//!
//! assert!(config.error_policy.skips());
//! ```

use serde::{Deserialize, Serialize};

/// What to do when a single event fails to decode or classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the whole run on the first failing event (default).
    #[default]
    Abort,

    /// Log the failure, omit the event, and keep going.
    #[serde(alias = "skip-and-report")]
    #[cfg_attr(feature = "cli", value(alias = "skip-and-report"))]
    Skip,
}

impl ErrorPolicy {
    /// Returns `true` if failing events are skipped rather than fatal.
    pub fn skips(self) -> bool {
        matches!(self, ErrorPolicy::Skip)
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPolicy::Abort => write!(f, "abort"),
            ErrorPolicy::Skip => write!(f, "skip"),
        }
    }
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" | "skip-and-report" => Ok(ErrorPolicy::Skip),
            _ => Err(format!(
                "Unknown error policy: '{}'. Expected one of: abort, skip",
                s
            )),
        }
    }
}

/// Configuration for a normalization run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-event failure handling (default: abort)
    pub error_policy: ErrorPolicy,

    /// Process users concurrently (default: false).
    ///
    /// Only takes effect with the `parallel` feature; record order across
    /// users is then unspecified.
    pub parallel: bool,
}

impl PipelineConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-event error policy.
    #[must_use]
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Enables or disables per-user parallelism.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.error_policy, ErrorPolicy::Abort);
        assert!(!config.parallel);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new()
            .with_error_policy(ErrorPolicy::Skip)
            .with_parallel(true);
        assert!(config.error_policy.skips());
        assert!(config.parallel);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(ErrorPolicy::from_str("ABORT").unwrap(), ErrorPolicy::Abort);
        assert_eq!(ErrorPolicy::from_str("skip").unwrap(), ErrorPolicy::Skip);
        assert_eq!(
            ErrorPolicy::from_str("skip-and-report").unwrap(),
            ErrorPolicy::Skip
        );
        assert!(ErrorPolicy::from_str("retry").is_err());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: PipelineConfig = serde_json::from_str(r#"{"error_policy":"skip"}"#).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::Skip);
        assert!(!config.parallel);
    }
}
