//! Plan context containing configuration and the resolved profile.

use crate::config::BundleConfig;
use crate::profile::BuildProfile;
use crate::resolve::resolve_path;
use std::path::{Path, PathBuf};

/// Everything plan construction reads.
///
/// The profile is fixed when the context is created; decision functions
/// receive it from here and never consult the environment themselves.
#[derive(Debug, Clone)]
pub struct PlanContext {
    /// The loaded configuration
    config: BundleConfig,
    /// Project root directory (where bundle.toml is located)
    project_root: PathBuf,
    profile: BuildProfile,
}

impl PlanContext {
    /// Create a new plan context.
    pub fn new(config: BundleConfig, project_root: PathBuf, profile: BuildProfile) -> Self {
        Self { config, project_root, profile }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn profile(&self) -> BuildProfile {
        self.profile
    }

    /// Get the source directory (resolved to absolute path).
    pub fn src_dir(&self) -> PathBuf {
        resolve_path(&self.project_root, &self.config.project.src)
    }

    /// Get the output directory (resolved to absolute path).
    pub fn out_dir(&self) -> PathBuf {
        resolve_path(&self.project_root, &self.config.project.out)
    }

    /// Well-known manifest location.
    pub fn manifest_path(&self) -> PathBuf {
        self.out_dir().join(&self.config.output.manifest)
    }

    /// URL prefix under which outputs are published.
    ///
    /// Production uses the configured absolute path; development points at
    /// the dev server so rendered pages fetch live assets.
    pub fn public_path(&self) -> String {
        match self.profile {
            BuildProfile::Production => self.config.output.public_path.clone(),
            BuildProfile::Development => format!(
                "http://{}:{}{}",
                self.config.dev_server.host, self.config.dev_server.port, self.config.output.public_path
            ),
        }
    }
}
