//! Post-build finalisation.
//!
//! Once the external engine has written its outputs, the hooks of the
//! active plugin set run over the engine's [`BuildReport`]: gzip
//! compression after compilation, then stripping of style-extraction child
//! entries and publication of the asset manifest after every file is on
//! disk.

pub mod compress;
pub mod manifest;
pub mod pipeline;
pub mod report;

pub use compress::{compress_asset, compress_report, gzip, CompressionOutcome, GZIP_SUFFIX};
pub use manifest::{Manifest, ManifestError};
pub use pipeline::{apply_hook, run, FinalizeOutcome, FinalizeTarget};
pub use report::{BuildReport, EmittedAsset, StatChild};

use crate::plan::PlanError;
use thiserror::Error;

/// Error type for finalisation.
#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid build report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("asset '{filename}' listed in the build report could not be read: {source}")]
    MissingAsset {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}
