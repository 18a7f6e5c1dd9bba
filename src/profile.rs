//! Build profile resolution.
//!
//! The profile is derived once from an environment signal and then passed by
//! value into every decision function. Nothing else in the crate reads the
//! process environment.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable consulted when no other name is configured.
pub const DEFAULT_ENV_VAR: &str = "NODE_ENV";

/// The only signal value that selects [`BuildProfile::Production`].
pub const PRODUCTION_SIGNAL: &str = "production";

/// Resolved build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    /// Readable names, no fingerprints, dev-server public path
    #[default]
    Development,
    /// Minified, fingerprinted, compressed
    Production,
}

impl BuildProfile {
    /// Whether this is the production profile.
    pub fn is_production(self) -> bool {
        matches!(self, BuildProfile::Production)
    }

    /// Mode string handed to the transform engine.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildProfile::Development => "development",
            BuildProfile::Production => "production",
        }
    }
}

impl std::fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a profile from a raw signal.
///
/// Only the exact literal `"production"` selects production. Anything else,
/// including an absent signal or a differently-cased value, falls back to
/// development.
pub fn resolve(signal: Option<&str>) -> BuildProfile {
    match signal {
        Some(PRODUCTION_SIGNAL) => BuildProfile::Production,
        _ => BuildProfile::Development,
    }
}

/// Read the signal from `var` and resolve it.
///
/// A value that is not valid unicode counts as absent.
pub fn from_env_var(var: &str) -> BuildProfile {
    let signal = env::var(var).ok();
    let profile = resolve(signal.as_deref());
    tracing::debug!(var, signal = ?signal, %profile, "resolved build profile");
    profile
}

/// Read the signal from [`DEFAULT_ENV_VAR`] and resolve it.
pub fn from_env() -> BuildProfile {
    from_env_var(DEFAULT_ENV_VAR)
}
