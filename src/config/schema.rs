//! Configuration schema types for `bundle.toml`
//!
//! Defines the structure and validation rules for bundleplan project
//! configuration. Every section is optional; the defaults reproduce the
//! stock asset pipeline (vendor splitting, `/webpack/` public path, dev
//! server on port 3808).

use crate::plan::ContainmentScope;
use crate::profile::DEFAULT_ENV_VAR;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,
    /// Entry module handed to the engine
    #[serde(default = "default_entry")]
    pub entry: String,
    /// Chunk name of the entry point
    #[serde(default = "default_entry_name")]
    pub entry_name: String,
    /// Source directory (first module search root)
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Build output directory
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            entry: default_entry(),
            entry_name: default_entry_name(),
            src: default_src(),
            out: default_out(),
        }
    }
}

fn default_name() -> String {
    "assets".to_string()
}

fn default_entry() -> String {
    "index.js".to_string()
}

fn default_entry_name() -> String {
    "main".to_string()
}

fn default_src() -> PathBuf {
    PathBuf::from("src")
}

fn default_out() -> PathBuf {
    PathBuf::from("public/webpack")
}

/// Output publication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Public path prefix used in production
    #[serde(default = "default_public_path")]
    pub public_path: String,
    /// Manifest filename inside the output directory
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { public_path: default_public_path(), manifest: default_manifest() }
    }
}

fn default_public_path() -> String {
    "/webpack/".to_string()
}

fn default_manifest() -> String {
    crate::plan::MANIFEST_FILENAME.to_string()
}

/// Development server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DevServerSection {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3808
}

/// Compression settings (production only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Minimum asset size in bytes
    #[serde(default = "default_threshold")]
    pub threshold: u64,
    /// Maximum compressed/original ratio
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { threshold: default_threshold(), min_ratio: default_min_ratio() }
    }
}

fn default_threshold() -> u64 {
    4096
}

fn default_min_ratio() -> f64 {
    0.8
}

/// An additional chunk group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    /// Regular expression over module identifiers
    pub test: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub scope: ContainmentScope,
}

/// Chunk splitting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunksConfig {
    /// Register the built-in vendor group
    #[serde(default = "default_true")]
    pub vendor: bool,
    /// Extra groups
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl Default for ChunksConfig {
    fn default() -> Self {
        Self { vendor: true, groups: Vec::new() }
    }
}

fn default_true() -> bool {
    true
}

/// Locale whitelist for the date library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalesConfig {
    #[serde(default = "default_locales")]
    pub whitelist: Vec<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self { whitelist: default_locales() }
    }
}

fn default_locales() -> Vec<String> {
    vec!["ru".to_string(), "en".to_string()]
}

/// Profile signal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Environment variable holding the signal
    #[serde(default = "default_env_var")]
    pub env_var: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self { env_var: default_env_var() }
    }
}

fn default_env_var() -> String {
    DEFAULT_ENV_VAR.to_string()
}

/// Complete bundle.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BundleConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub dev_server: DevServerSection,
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub chunks: ChunksConfig,
    #[serde(default)]
    pub locales: LocalesConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "chunks.groups[0].name")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bundle.toml: '{}' {}", self.field, self.message)
    }
}

impl BundleConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: &str| {
            errors.push(ConfigValidationError { field, message: message.to_string() })
        };

        if self.project.entry.is_empty() {
            push("project.entry".to_string(), "must be a non-empty string");
        }
        if self.project.entry_name.is_empty() {
            push("project.entry_name".to_string(), "must be a non-empty string");
        }

        if !self.output.public_path.ends_with('/') {
            push("output.public_path".to_string(), "must end with '/'");
        }
        if self.output.manifest.is_empty() || self.output.manifest.contains('/') {
            push("output.manifest".to_string(), "must be a bare filename");
        }

        if self.dev_server.host.is_empty() {
            push("dev_server.host".to_string(), "must be a non-empty string");
        }
        if self.dev_server.port == 0 {
            push("dev_server.port".to_string(), "must be a positive integer");
        }

        if !(self.compression.min_ratio > 0.0 && self.compression.min_ratio <= 1.0) {
            push("compression.min_ratio".to_string(), "must be in (0, 1]");
        }

        for (i, group) in self.chunks.groups.iter().enumerate() {
            if group.name.is_empty() {
                push(format!("chunks.groups[{}].name", i), "must be a non-empty string");
            }
            if let Err(e) = regex::Regex::new(&group.test) {
                push(format!("chunks.groups[{}].test", i), &format!("is not a valid pattern: {}", e));
            }
        }

        if self.profile.env_var.is_empty() {
            push("profile.env_var".to_string(), "must be a non-empty string");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
