//! Module resolution declaration.
//!
//! The engine performs resolution; the plan only states where to search,
//! which extensions to try and in what order, and the path aliases.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extensions tried when an import omits one, highest priority first.
pub const EXTENSIONS: [&str; 5] = [".es6", ".jsx", ".sass", ".css", ".js"];

/// Alias that points at the source root.
pub const SOURCE_ALIAS: &str = "~";

/// Resolution settings handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveConfig {
    /// Search roots, in order
    pub modules: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub alias: BTreeMap<String, PathBuf>,
}

impl ResolveConfig {
    /// Search the source directory first, then third-party dependencies.
    pub fn new(project_root: &Path, src: &Path) -> Self {
        let src = resolve_path(project_root, src);
        let mut alias = BTreeMap::new();
        alias.insert(SOURCE_ALIAS.to_string(), src.clone());
        Self {
            modules: vec![src, project_root.join("node_modules")],
            extensions: EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            alias,
        }
    }

    /// Priority of an extension, lower is tried first.
    pub fn extension_priority(&self, ext: &str) -> Option<usize> {
        self.extensions.iter().position(|e| e == ext)
    }
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
