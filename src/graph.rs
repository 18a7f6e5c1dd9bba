//! Module graph supplied by the external resolver.
//!
//! The graph lists every module the resolver found together with the entry
//! point that pulled it in and whether it is part of that entry's initial
//! synchronous load or only reachable through a lazy import.
//!
//! # Format
//!
//! ```json
//! {
//!   "entries": ["main"],
//!   "modules": [
//!     { "id": "src/app.js", "entry": "main", "load": "initial" },
//!     { "id": "node_modules/moment/moment.js", "entry": "main",
//!       "load": { "lazy": { "chunk": "moment" } } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error loading a module graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    #[error("failed to read module graph {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse module graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("module '{module}' references unknown entry '{entry}'")]
    UnknownEntry { module: String, entry: String },
}

/// How a module becomes reachable from its entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    /// Part of the entry's initial synchronous load
    Initial,
    /// Reached only through a lazy import
    Lazy {
        /// Name requested for the lazy chunk, if the import named one
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chunk: Option<String>,
    },
}

impl LoadKind {
    pub fn is_initial(&self) -> bool {
        matches!(self, LoadKind::Initial)
    }
}

/// A module as seen by the chunking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRef {
    /// Module identifier (resolved path)
    pub id: String,
    /// Entry point that pulled the module in
    pub entry: String,
    pub load: LoadKind,
}

impl ModuleRef {
    /// A module in an entry's initial load.
    pub fn initial(id: &str, entry: &str) -> Self {
        Self { id: id.to_string(), entry: entry.to_string(), load: LoadKind::Initial }
    }

    /// A lazily imported module. Without a chunk name the file stem is used.
    pub fn lazy(id: &str, entry: &str, chunk: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            entry: entry.to_string(),
            load: LoadKind::Lazy { chunk: chunk.map(str::to_string) },
        }
    }

    /// Name of the chunk this module rides with when no group claims it.
    pub fn natural_chunk(&self) -> String {
        match &self.load {
            LoadKind::Initial => self.entry.clone(),
            LoadKind::Lazy { chunk: Some(name) } => name.clone(),
            LoadKind::Lazy { chunk: None } => lazy_chunk_name(&self.id),
        }
    }
}

/// Derive a lazy chunk name from a module id.
///
/// Package entry files (`node_modules/<pkg>/index.js` or `<pkg>/<pkg>.js`)
/// are named after the package; everything else after the file stem.
/// Scoped packages keep their scope, so `@scope/a` and `@scope/b` differ.
fn lazy_chunk_name(id: &str) -> String {
    let normalized = id.replace('\\', "/");
    let path = Path::new(&normalized);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(&normalized);

    if let Some((_, rest)) = normalized.rsplit_once("node_modules/") {
        let mut segments = rest.split('/');
        let first = segments.next().unwrap_or(rest);
        let (package, base) = match segments.next() {
            Some(second) if first.starts_with('@') => (format!("{}/{}", first, second), second),
            _ => (first.to_string(), first),
        };
        if stem == "index" || stem == base {
            return package;
        }
    }
    stem.to_string()
}

/// Modules and entry points of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGraph {
    pub entries: Vec<String>,
    pub modules: Vec<ModuleRef>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry point.
    pub fn with_entry(mut self, name: &str) -> Self {
        if !self.entries.iter().any(|e| e == name) {
            self.entries.push(name.to_string());
        }
        self
    }

    /// Add a module.
    pub fn with_module(mut self, module: ModuleRef) -> Self {
        self.modules.push(module);
        self
    }

    /// Load a graph from a JSON file and check entry references.
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let file = File::open(path)
            .map_err(|source| GraphError::Io { path: path.to_path_buf(), source })?;
        let graph: ModuleGraph = serde_json::from_reader(BufReader::new(file))?;
        graph.check_entries()?;
        Ok(graph)
    }

    /// Every module must name a declared entry.
    pub fn check_entries(&self) -> Result<(), GraphError> {
        for module in &self.modules {
            if !self.entries.contains(&module.entry) {
                return Err(GraphError::UnknownEntry {
                    module: module.id.clone(),
                    entry: module.entry.clone(),
                });
            }
        }
        Ok(())
    }
}
