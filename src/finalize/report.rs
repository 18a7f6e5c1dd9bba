//! Build report produced by the external engine.
//!
//! After the engine has written its outputs it hands over a report listing
//! every emitted asset and the child compilations it ran. The report is what
//! post-compile and post-write plugins transform.
//!
//! # Format
//!
//! ```json
//! {
//!   "assets": [
//!     { "name": "main.js", "filename": "main-3f2a9c0d11b7e4a5c6d8.js", "chunk": "main" },
//!     { "name": "main.css", "filename": "main-9e1d04b2c3a5f6e7d8c9.css", "chunk": "main" }
//!   ],
//!   "children": [{ "name": "extract-styles node_modules/css-loader/index.js!src/app.scss" }]
//! }
//! ```

use crate::finalize::{FinalizeError, Manifest};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// One file emitted by the engine or a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedAsset {
    /// Logical asset name, e.g. `main.js`
    pub name: String,
    /// Final filename under the output directory
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
    /// Produced by a plugin next to another asset; never a manifest entry
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auxiliary: bool,
    #[serde(skip)]
    pub contents: Vec<u8>,
    /// Whether `contents` still has to be written to disk
    #[serde(skip)]
    pub pending: bool,
}

impl EmittedAsset {
    /// An asset already written by the engine.
    pub fn written(name: &str, filename: &str, contents: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            filename: filename.to_string(),
            chunk: None,
            auxiliary: false,
            contents,
            pending: false,
        }
    }

    /// A plugin-produced artifact placed next to `source`.
    pub fn colocated(source: &EmittedAsset, suffix: &str, contents: Vec<u8>) -> Self {
        Self {
            name: format!("{}{}", source.name, suffix),
            filename: format!("{}{}", source.filename, suffix),
            chunk: source.chunk.clone(),
            auxiliary: true,
            contents,
            pending: true,
        }
    }
}

/// Child compilation entry of the build report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChild {
    pub name: String,
}

/// What the engine reports after writing its outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    #[serde(default)]
    pub assets: Vec<EmittedAsset>,
    #[serde(default)]
    pub children: Vec<StatChild>,
    /// Set by the manifest plugin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Manifest>,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a report from JSON; asset contents are not read.
    pub fn load(path: &Path) -> Result<Self, FinalizeError> {
        let file = File::open(path)?;
        let report = serde_json::from_reader(BufReader::new(file))?;
        Ok(report)
    }

    /// Read every asset's bytes from the output directory.
    pub fn read_contents(&mut self, out_dir: &Path) -> Result<(), FinalizeError> {
        for asset in &mut self.assets {
            let path = out_dir.join(&asset.filename);
            asset.contents = fs::read(&path).map_err(|source| FinalizeError::MissingAsset {
                filename: asset.filename.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Write assets produced by plugins.
    pub fn write_pending(&mut self, out_dir: &Path) -> Result<usize, FinalizeError> {
        let mut written = 0;
        for asset in self.assets.iter_mut().filter(|a| a.pending) {
            let path = out_dir.join(&asset.filename);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &asset.contents)?;
            tracing::debug!(file = %path.display(), bytes = asset.contents.len(), "wrote asset");
            asset.pending = false;
            written += 1;
        }
        Ok(written)
    }

    /// Find an asset by filename.
    pub fn asset(&self, filename: &str) -> Option<&EmittedAsset> {
        self.assets.iter().find(|a| a.filename == filename)
    }

    /// Insert an asset, replacing one with the same filename.
    pub fn upsert(&mut self, asset: EmittedAsset) {
        match self.assets.iter_mut().find(|a| a.filename == asset.filename) {
            Some(existing) => *existing = asset,
            None => self.assets.push(asset),
        }
    }

    /// Logical name to filename for every non-auxiliary asset.
    pub fn primary_mapping(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets.iter().filter(|a| !a.auxiliary).map(|a| (a.name.as_str(), a.filename.as_str()))
    }
}
