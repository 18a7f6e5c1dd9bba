//! Configuration module for the bundleplan build planner
//!
//! Provides types and parsing for `bundle.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{default_config, load_config, ConfigError, CONFIG_FILENAME};
pub use schema::*;
