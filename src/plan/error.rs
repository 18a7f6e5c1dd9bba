//! Errors raised while constructing a build plan.

use thiserror::Error;

/// Fatal plan construction error.
///
/// Plan construction is deterministic, so none of these are retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanError {
    /// Two or more groups share a priority, so their order is undefined
    #[error("chunk groups {} share priority {priority}", .groups.join(", "))]
    PriorityConflict { priority: i32, groups: Vec<String> },

    /// Two distinct owners claim the same output filename or logical asset name
    #[error("'{first}' and '{second}' both resolve to '{filename}'")]
    NamingCollision { filename: String, first: String, second: String },

    /// A rule or group test failed to compile
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Two groups registered under the same name
    #[error("chunk group '{0}' is registered more than once")]
    DuplicateGroup(String),

    /// A chunk or group name is empty
    #[error("chunk name must be a non-empty string")]
    EmptyChunkName,
}
