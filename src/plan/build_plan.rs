//! Build plan assembly.
//!
//! A [`BuildPlan`] is computed once per invocation as a pure function of the
//! plan context. Chunk layout and output naming are derived from the plan
//! and a module graph; every error surfaces here, before any transform runs.

use crate::graph::ModuleGraph;
use crate::plan::chunk::{ChunkGroup, ChunkId, ChunkLayout, ChunkingPolicy};
use crate::plan::naming::{check_unique, engine_pattern, name_for, AssetKind, FilenameTemplate};
use crate::plan::plugins::{assemble_plugins, LocaleFilter, Plugin, PluginSettings};
use crate::plan::rules::{build_rules, RuleKind, RuleTable};
use crate::plan::{PlanContext, PlanError};
use crate::profile::BuildProfile;
use crate::resolve::ResolveConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings for the external development server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevServerConfig {
    pub host: String,
    pub port: u16,
    /// Value of the `Access-Control-Allow-Origin` header
    pub cors_header: String,
    pub disable_host_check: bool,
}

/// Output section of the plan.
#[derive(Debug, Clone, Serialize)]
pub struct OutputPlan {
    /// Directory every output is written under
    pub path: PathBuf,
    pub public_path: String,
    /// Engine filename pattern for entry and group chunks
    pub filename: String,
    /// Engine filename pattern for lazy chunks
    pub chunk_filename: String,
    /// Well-known manifest location
    pub manifest: PathBuf,
}

/// Complete, internally consistent build plan for one profile.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub mode: BuildProfile,
    /// Entry chunk name to entry module
    pub entry: BTreeMap<String, String>,
    pub output: OutputPlan,
    pub resolve: ResolveConfig,
    pub rules: RuleTable,
    pub split_chunks: ChunkingPolicy,
    pub minimize: bool,
    /// Source map style, development only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,
    pub plugins: Vec<Plugin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServerConfig>,
}

impl BuildPlan {
    /// Construct the plan for the context's profile.
    pub fn construct(ctx: &PlanContext) -> Result<Self, PlanError> {
        let profile = ctx.profile();
        let config = ctx.config();

        let mut groups = Vec::new();
        if config.chunks.vendor {
            groups.push(ChunkGroup::vendor()?);
        }
        for group in &config.chunks.groups {
            groups.push(ChunkGroup::new(&group.name, &group.test, group.priority, group.scope)?);
        }
        let split_chunks = ChunkingPolicy::new(groups)?;

        let public_path = ctx.public_path();
        let settings = PluginSettings {
            public_path: public_path.clone(),
            manifest_file: config.output.manifest.clone(),
            locales: config.locales.whitelist.clone(),
            compression_threshold: config.compression.threshold,
            compression_min_ratio: config.compression.min_ratio,
        };
        let plugins = assemble_plugins(profile, &settings)?;

        let dev_server = match profile {
            BuildProfile::Development => Some(DevServerConfig {
                host: config.dev_server.host.clone(),
                port: config.dev_server.port,
                cors_header: "*".to_string(),
                disable_host_check: true,
            }),
            BuildProfile::Production => None,
        };

        let mut entry = BTreeMap::new();
        entry.insert(config.project.entry_name.clone(), config.project.entry.clone());

        let script_pattern = engine_pattern(AssetKind::Script, profile);
        let plan = Self {
            mode: profile,
            entry,
            output: OutputPlan {
                path: ctx.out_dir(),
                public_path,
                filename: script_pattern.clone(),
                chunk_filename: script_pattern,
                manifest: ctx.manifest_path(),
            },
            resolve: ResolveConfig::new(ctx.project_root(), &config.project.src),
            rules: build_rules(profile)?,
            split_chunks,
            minimize: profile.is_production(),
            devtool: (!profile.is_production()).then(|| "source-map".to_string()),
            plugins,
            dev_server,
        };

        tracing::info!(
            profile = %profile,
            rules = plan.rules.len(),
            groups = plan.split_chunks.groups().len(),
            plugins = plan.plugins.len(),
            "constructed build plan"
        );
        Ok(plan)
    }

    /// The locale filter of the context-replacement plugin, if active.
    pub fn locale_filter(&self) -> Option<&LocaleFilter> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::ContextReplacement(filter) => Some(filter),
            _ => None,
        })
    }

    /// Find a plugin by id.
    pub fn plugin(&self, id: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.id() == id)
    }

    /// Classify a module graph into chunks.
    pub fn layout(&self, graph: &ModuleGraph) -> ChunkLayout {
        let filter = self.locale_filter();
        self.split_chunks.layout(graph, |id| filter.map_or(true, |f| f.admits(id)))
    }

    /// Lay out a graph and name every resulting output.
    ///
    /// A chunk gets a style output when any of its modules goes through the
    /// style chain. Fails if two chunks would share a filename.
    pub fn outline(&self, graph: &ModuleGraph) -> Result<ChunkOutline, PlanError> {
        let layout = self.layout(graph);

        let mut outputs = Vec::with_capacity(layout.chunks.len());
        for chunk in &layout.chunks {
            let script = name_for(&chunk.id.name, AssetKind::Script, self.mode)?;
            let has_styles = chunk.modules.iter().any(|m| {
                self.rules.rule_for(m).is_some_and(|r| r.kind == RuleKind::Style)
            });
            let style = if has_styles {
                Some(name_for(&chunk.id.name, AssetKind::Style, self.mode)?)
            } else {
                None
            };
            outputs.push(ChunkOutput { chunk: chunk.id.clone(), script, style });
        }

        let mut named: Vec<(String, String)> = Vec::new();
        for output in &outputs {
            let owner = output.chunk.to_string();
            named.push((owner.clone(), output.script.to_string()));
            if let Some(style) = &output.style {
                named.push((owner, style.to_string()));
            }
        }
        check_unique(named.iter().map(|(owner, name)| (owner.clone(), name.as_str())))?;

        Ok(ChunkOutline { layout, outputs })
    }
}

/// Filename templates of one chunk.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkOutput {
    pub chunk: ChunkId,
    pub script: FilenameTemplate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<FilenameTemplate>,
}

/// Chunk layout plus the naming of every output.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkOutline {
    pub layout: ChunkLayout,
    pub outputs: Vec<ChunkOutput>,
}

impl ChunkOutline {
    /// Output templates of a chunk by name.
    pub fn output(&self, chunk: &str) -> Option<&ChunkOutput> {
        self.outputs.iter().find(|o| o.chunk.name == chunk)
    }
}
