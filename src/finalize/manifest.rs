//! Asset manifest published after every output is written.
//!
//! The manifest maps logical asset names (`main.js`) to the final filenames
//! the build produced (`main-3f2a9c0d11b7e4a5c6d8.js`) so that server-side
//! templates can emit the right URLs. It is written atomically: readers see
//! either the previous manifest or the complete new one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors from reading or writing the manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to replace manifest at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Logical name to published filename mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub base_public_path: String,
    pub entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Build a manifest from the final mapping.
    pub fn publish<'a, I>(mapping: I, base_public_path: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let entries = mapping.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Self { base_public_path: base_public_path.to_string(), entries }
    }

    pub fn get(&self, logical: &str) -> Option<&str> {
        self.entries.get(logical).map(String::as_str)
    }

    /// Full URL of a logical asset.
    pub fn url_for(&self, logical: &str) -> Option<String> {
        self.get(logical).map(|filename| format!("{}{}", self.base_public_path, filename))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let file = File::open(path)
            .map_err(|source| ManifestError::Io { path: path.to_path_buf(), source })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the manifest, replacing any previous one in a single rename.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .map_err(|source| ManifestError::Io { path: dir.to_path_buf(), source })?;

        let io_err = |source| ManifestError::Io { path: path.to_path_buf(), source };
        let temp = NamedTempFile::new_in(dir).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n").map_err(io_err)?;
            writer.flush().map_err(io_err)?;
        }
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(path)
            .map_err(|e| ManifestError::Persist { path: path.to_path_buf(), source: e.error })?;

        tracing::info!(path = %path.display(), entries = self.len(), "manifest written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Manifest {
        Manifest::publish(
            [("main.js", "main-aaaa.js"), ("vendor.js", "vendor-bbbb.js")],
            "/webpack/",
        )
    }

    #[test]
    fn test_publish_and_lookup() {
        let manifest = sample();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get("main.js"), Some("main-aaaa.js"));
        assert_eq!(manifest.url_for("vendor.js").as_deref(), Some("/webpack/vendor-bbbb.js"));
        assert_eq!(manifest.url_for("missing.js"), None);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).expect("should serialize");
        assert_eq!(json["basePublicPath"], "/webpack/");
        assert_eq!(json["entries"]["main.js"], "main-aaaa.js");
    }

    #[test]
    fn test_write_and_load() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join("nested/manifest.json");
        sample().write(&path).expect("manifest should write");
        assert_eq!(Manifest::load(&path).expect("manifest should load"), sample());
    }

    #[test]
    fn test_write_replaces_without_leftovers() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = temp.path().join("manifest.json");
        fs::write(&path, "{ stale").expect("should write file");

        sample().write(&path).expect("manifest should write");
        let names: Vec<_> = fs::read_dir(temp.path())
            .expect("should read dir")
            .map(|e| e.expect("should read entry").file_name().into_string().expect("should be UTF-8"))
            .collect();
        assert_eq!(names, vec!["manifest.json".to_string()]);
        assert_eq!(Manifest::load(&path).expect("manifest should load"), sample());
    }

    #[test]
    fn test_load_missing() {
        let temp = TempDir::new().expect("should create temp dir");
        let err = Manifest::load(&temp.path().join("manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
