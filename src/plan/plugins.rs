//! Plugin activation set.
//!
//! Plugins are plain data: an id, a configuration and the lifecycle phase in
//! which they act. Compile-phase plugins configure the external engine;
//! post-compile and post-write plugins are run by [`crate::finalize`] as an
//! explicit ordered pipeline over the engine's build report.

use crate::plan::naming::{engine_pattern, AssetKind};
use crate::plan::{Pattern, PlanError};
use crate::profile::BuildProfile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix of build-report children created by the style extraction stage.
pub const EXTRACT_CHILD_PREFIX: &str = "extract-styles";

/// Constant frozen by the define plugin.
pub const ENV_MARKER: &str = "process.env.NODE_ENV";

/// Default well-known manifest filename.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Resource whose locale variants are filtered.
pub const LOCALE_RESOURCE: &str = r"moment[/\\]locale$";

/// When a plugin acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecyclePhase {
    /// Executed inside the engine while compiling
    Compile,
    /// After naming and minification, before outputs are final
    PostCompile,
    /// After every output has been written
    PostWrite,
}

/// Keeps only whitelisted locale variants of the date library.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleFilter {
    pub resource: Pattern,
    pub locales: Vec<String>,
    #[serde(skip)]
    locale_test: Pattern,
}

impl LocaleFilter {
    pub fn new(locales: &[String]) -> Result<Self, PlanError> {
        let alternatives: Vec<String> = locales.iter().map(|l| regex::escape(l)).collect();
        let locale_test = Pattern::new(&format!("^(?:{})(?:-|$)", alternatives.join("|")))?;
        Ok(Self { resource: Pattern::new(LOCALE_RESOURCE)?, locales: locales.to_vec(), locale_test })
    }

    /// Whether a module survives the filter.
    ///
    /// Modules outside the locale directory are always admitted.
    pub fn admits(&self, module_id: &str) -> bool {
        let normalized = module_id.replace('\\', "/");
        let path = Path::new(&normalized);
        let dir = path.parent().and_then(|p| p.to_str()).unwrap_or("");
        if !self.resource.is_match(dir) {
            return true;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        !self.locales.is_empty() && self.locale_test.is_match(stem)
    }
}

/// Gzip post-processing settings.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionSettings {
    pub algorithm: String,
    pub test: Pattern,
    /// Minimum size in bytes before an asset is considered
    pub threshold: u64,
    /// Compressed/original ratio an artifact must stay below
    pub min_ratio: f64,
}

impl CompressionSettings {
    pub fn new(threshold: u64, min_ratio: f64) -> Result<Self, PlanError> {
        Ok(Self {
            algorithm: "gzip".to_string(),
            test: Pattern::new(r"\.js$|\.css$")?,
            threshold,
            min_ratio,
        })
    }
}

/// One active plugin and its configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "id", rename_all = "kebab-case")]
pub enum Plugin {
    ExtractStyles { filename: String, chunk_filename: String, hot: bool },
    StripExtractChildren { prefix: String },
    Manifest { public_path: String, file_name: String, write_to_disk: bool },
    ContextReplacement(LocaleFilter),
    Define { definitions: BTreeMap<String, String> },
    Compression(CompressionSettings),
    NamedModules,
}

impl Plugin {
    /// Stable plugin identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Plugin::ExtractStyles { .. } => "extract-styles",
            Plugin::StripExtractChildren { .. } => "strip-extract-children",
            Plugin::Manifest { .. } => "manifest",
            Plugin::ContextReplacement(_) => "context-replacement",
            Plugin::Define { .. } => "define",
            Plugin::Compression(_) => "compression",
            Plugin::NamedModules => "named-modules",
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self {
            Plugin::Compression(_) => LifecyclePhase::PostCompile,
            Plugin::Manifest { .. } | Plugin::StripExtractChildren { .. } => {
                LifecyclePhase::PostWrite
            }
            _ => LifecyclePhase::Compile,
        }
    }
}

/// Inputs to plugin assembly that come from configuration.
#[derive(Debug, Clone)]
pub struct PluginSettings {
    pub public_path: String,
    pub manifest_file: String,
    pub locales: Vec<String>,
    pub compression_threshold: u64,
    pub compression_min_ratio: f64,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            public_path: "/webpack/".to_string(),
            manifest_file: MANIFEST_FILENAME.to_string(),
            locales: vec!["ru".to_string(), "en".to_string()],
            compression_threshold: 4096,
            compression_min_ratio: 0.8,
        }
    }
}

/// Assemble the ordered plugin list for a profile.
pub fn assemble_plugins(
    profile: BuildProfile,
    settings: &PluginSettings,
) -> Result<Vec<Plugin>, PlanError> {
    let style_pattern = engine_pattern(AssetKind::Style, profile);
    let mut plugins = vec![
        Plugin::ExtractStyles {
            filename: style_pattern.clone(),
            chunk_filename: style_pattern,
            hot: !profile.is_production(),
        },
        Plugin::StripExtractChildren { prefix: EXTRACT_CHILD_PREFIX.to_string() },
        Plugin::Manifest {
            public_path: settings.public_path.clone(),
            file_name: settings.manifest_file.clone(),
            write_to_disk: true,
        },
        Plugin::ContextReplacement(LocaleFilter::new(&settings.locales)?),
    ];

    match profile {
        BuildProfile::Production => {
            let mut definitions = BTreeMap::new();
            definitions.insert(ENV_MARKER.to_string(), format!("\"{}\"", profile.as_str()));
            plugins.push(Plugin::Define { definitions });
            plugins.push(Plugin::Compression(CompressionSettings::new(
                settings.compression_threshold,
                settings.compression_min_ratio,
            )?));
        }
        BuildProfile::Development => plugins.push(Plugin::NamedModules),
    }

    Ok(plugins)
}
