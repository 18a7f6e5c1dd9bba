//! Compiled input-identifier patterns.

use crate::plan::PlanError;
use regex::Regex;
use serde::{Serialize, Serializer};

/// A regular expression matched against module identifiers.
///
/// Serializes as its source text so plans stay readable as JSON.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> Result<Self, PlanError> {
        let regex = Regex::new(source).map_err(|source_err| PlanError::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self { regex })
    }

    /// Whether the identifier matches.
    pub fn is_match(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
