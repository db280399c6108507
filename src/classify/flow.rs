//! Regex-based flow detection.

use regex::Regex;

use crate::core::models::FlowRule;
use crate::error::{ChatnormError, Result};

#[derive(Debug, Clone)]
struct CompiledRule {
    flow: String,
    patterns: Vec<Regex>,
}

/// An ordered, pre-compiled flow rule set.
///
/// Rules are tried in order and, within a rule, patterns in order. Patterns
/// search anywhere in the text; the first hit decides the flow.
///
/// # Example
///
/// ```rust
/// use chatnorm::classify::FlowMatcher;
/// use chatnorm::core::models::FlowRule;
///
/// # fn main() -> chatnorm::Result<()> {
/// let matcher = FlowMatcher::new(&[
///     FlowRule::new("BOOKING", ["book.*room"]),
///     FlowRule::new("GREETING", ["hello", "hi"]),
/// ])?;
///
/// assert_eq!(matcher.find("please book a room"), Some("BOOKING"));
/// assert_eq!(matcher.find("goodbye"), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlowMatcher {
    rules: Vec<CompiledRule>,
}

impl FlowMatcher {
    /// Compiles every pattern up front.
    ///
    /// Fails with [`ChatnormError::InvalidPattern`] on the first pattern that
    /// does not compile.
    pub fn new(rules: &[FlowRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let patterns = rule
                    .regexes
                    .iter()
                    .map(|pattern| {
                        Regex::new(pattern).map_err(|e| ChatnormError::InvalidPattern {
                            flow: rule.flow_name.clone(),
                            pattern: pattern.clone(),
                            source: Box::new(e),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledRule {
                    flow: rule.flow_name.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Returns the flow of the first rule with a matching pattern.
    pub fn find(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.patterns.iter().any(|re| re.is_match(text)))
            .map(|rule| rule.flow.as_str())
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
